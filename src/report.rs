//! Prediction Report Module
//!
//! Evaluates a location's four curves for one date and compares each
//! prediction with the location's reference observation.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::curve::CurveFit;
use crate::error::Result;
use crate::profile::{LocationProfile, ProfileStore};
use crate::time::day_of_year;

// ===================== TYPES =====================

/// The four modeled daily quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Sunrise,
    Sunset,
    SolarNoon,
    DayLength,
}

impl Quantity {
    pub const ALL: [Quantity; 4] =
        [Quantity::Sunrise, Quantity::Sunset, Quantity::SolarNoon, Quantity::DayLength];

    pub fn label(self) -> &'static str {
        match self {
            Quantity::Sunrise => "Sunrise",
            Quantity::Sunset => "Sunset",
            Quantity::SolarNoon => "Solar Noon",
            Quantity::DayLength => "Day Length",
        }
    }

    fn curve(self, p: &LocationProfile) -> &CurveFit {
        match self {
            Quantity::Sunrise => &p.sunrise,
            Quantity::Sunset => &p.sunset,
            Quantity::SolarNoon => &p.solar_noon,
            Quantity::DayLength => &p.day_length,
        }
    }

    fn actual(self, p: &LocationProfile) -> f64 {
        match self {
            Quantity::Sunrise => p.sunrise_actual,
            Quantity::Sunset => p.sunset_actual,
            Quantity::SolarNoon => p.solar_noon_actual,
            Quantity::DayLength => p.day_length_actual,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One predicted quantity next to its observed value, both in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub quantity: Quantity,
    pub predicted: f64,
    pub actual: f64,
}

impl Prediction {
    pub fn diff_hours(&self) -> f64 {
        (self.actual - self.predicted).abs()
    }

    pub fn diff_minutes(&self) -> f64 {
        self.diff_hours() * 60.0
    }
}

/// Result of one prediction run.
#[derive(Debug, Clone)]
pub struct Report {
    pub location: String,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub day: u32,
    pub predictions: [Prediction; 4],
}

// ===================== COMPUTATION =====================

impl Report {
    /// Build the report for `location` on `date`.
    ///
    /// Fails with `UnknownLocation` before anything is evaluated.
    pub fn compute(store: &ProfileStore, location: &str, date: NaiveDate) -> Result<Self> {
        let profile = store.get(location)?;

        if let Some(observed) = profile.observed_on
            && observed != date
        {
            tracing::warn!(
                location,
                %observed,
                date = %date,
                "reference observation is from a different day; differences compare unlike days"
            );
        }

        let day = day_of_year(date);
        tracing::debug!(location, %date, day, "evaluating curve fits");

        let predictions = Quantity::ALL.map(|q| {
            let predicted = q.curve(profile).evaluate(f64::from(day));
            tracing::debug!(quantity = q.label(), predicted, actual = q.actual(profile));
            Prediction { quantity: q, predicted, actual: q.actual(profile) }
        });

        Ok(Self {
            location: location.to_string(),
            name: profile.name.clone(),
            date,
            day,
            predictions,
        })
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn prediction(&self, quantity: Quantity) -> &Prediction {
        // `predictions` follows the order of `Quantity::ALL`
        &self.predictions[quantity as usize]
    }

    /// Equal-weight mean of the four absolute differences, in hours.
    pub fn mean_diff_hours(&self) -> f64 {
        self.predictions.iter().map(Prediction::diff_hours).sum::<f64>() / 4.0
    }

    pub fn mean_diff_minutes(&self) -> f64 {
        self.mean_diff_hours() * 60.0
    }
}

// ===================== TESTS =====================
