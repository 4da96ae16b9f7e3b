//! Location Profile Store Module
//!
//! Holds the curve-fit parameters and reference observations per location.
//! The built-in table is constructed once and never mutated; a JSON profiles
//! file may add or replace entries at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::curve::CurveFit;
use crate::error::{Result, SunfitError};

static BUILTIN: OnceLock<BTreeMap<String, LocationProfile>> = OnceLock::new();

// ===================== TYPES =====================

/// Fitted curves and one day of reference observations for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationProfile {
    /// Human-readable place name
    #[serde(default)]
    pub name: Option<String>,
    pub sunrise: CurveFit,
    pub sunset: CurveFit,
    pub solar_noon: CurveFit,
    pub day_length: CurveFit,
    /// Observed sunrise, fractional hours
    pub sunrise_actual: f64,
    pub sunset_actual: f64,
    pub solar_noon_actual: f64,
    /// Observed day length, hours
    pub day_length_actual: f64,
    /// Day the `*_actual` values were observed on
    #[serde(default)]
    pub observed_on: Option<NaiveDate>,
}

/// Read-only lookup from location key to profile.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles: BTreeMap<String, LocationProfile>,
}

// ===================== BUILT-IN TABLE =====================

fn builtin_profiles() -> BTreeMap<String, LocationProfile> {
    let observed_on = NaiveDate::from_ymd_opt(2024, 2, 14);
    let mut map = BTreeMap::new();

    // Seattle, WA
    map.insert(
        "seattle".to_string(),
        LocationProfile {
            name: Some("Seattle, WA".to_string()),
            sunrise: CurveFit::new(1.383, 0.0172, 102.0, 6.583),
            sunset: CurveFit::new(2.408, 0.0172, -95.5, 18.775),
            solar_noon: CurveFit::new(1.05, 0.0344, -186.75, 12.933),
            day_length: CurveFit::new(3.775, 0.0172, -77.5, 12.208),
            sunrise_actual: 7.0 + 16.0 / 60.0,
            sunset_actual: 17.0 + 30.0 / 60.0,
            solar_noon_actual: 12.0 + 23.0 / 60.0,
            day_length_actual: 10.0 + 14.0 / 60.0 + 10.0 / 3600.0,
            observed_on,
        },
    );

    // Tucson, AZ
    map.insert(
        "tucson".to_string(),
        LocationProfile {
            name: Some("Tucson, AZ".to_string()),
            sunrise: CurveFit::new(1.075, 0.01721420632103996, 84.0, 6.341666666666667),
            sunset: CurveFit::new(1.116666666666667, 0.01721420632103996, -73.0, 18.433333333333334),
            solar_noon: CurveFit::new(0.25, 0.03442841264207992, 155.0, 12.366666666666667),
            day_length: CurveFit::new(
                2.1166666666666663,
                0.01721420632103996,
                -84.5,
                12.150000000000002,
            ),
            sunrise_actual: 7.0 + 7.0 / 60.0,
            sunset_actual: 18.0 + 8.0 / 60.0,
            solar_noon_actual: 12.0 + 37.0 / 60.0,
            day_length_actual: 11.0 + 1.0 / 60.0 + 17.0 / 3600.0,
            observed_on,
        },
    );

    map
}

// ===================== STORE =====================

impl ProfileStore {
    /// Store containing only the built-in locations.
    pub fn builtin() -> Self {
        Self { profiles: BUILTIN.get_or_init(builtin_profiles).clone() }
    }

    /// Built-in locations, extended or overridden by a JSON profiles file.
    ///
    /// The file holds an object mapping location keys to profiles.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| SunfitError::io(path, e))?;
        let extra: BTreeMap<String, LocationProfile> =
            serde_json::from_str(&raw).map_err(|e| SunfitError::json(path, e))?;
        let mut store = Self::builtin();
        for (key, profile) in extra {
            if store.profiles.contains_key(&key) {
                tracing::info!(location = %key, file = %path.display(), "overriding built-in profile");
            } else {
                tracing::debug!(location = %key, file = %path.display(), "adding profile");
            }
            store.profiles.insert(key, profile);
        }
        Ok(store)
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, key: &str) -> Result<&LocationProfile> {
        self.profiles.get(key).ok_or_else(|| SunfitError::UnknownLocation(key.to_string()))
    }

    /// Known keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocationProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ===================== TESTS =====================
