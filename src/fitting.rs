//! Curve Fitting Module
//!
//! Derives sinusoidal `CurveFit` parameters from a year of daily observations.
//!
//! The fit is a heuristic rather than a least-squares solve: amplitude and
//! midline come from the observed extremes, and the phase comes from the day
//! whose value sits closest to the midline together with the local slope there.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::curve::{CurveFit, YEAR_DAYS};
use crate::error::{Result, SunfitError};
use crate::report::Quantity;
use crate::time::{day_of_year, parse_clock};

// ===================== INPUT =====================

/// A JSON value that may be written as a number or as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Num(f64),
    Text(String),
}

impl Loose {
    /// Non-negative whole number (day, month or year).
    fn as_day(&self) -> Option<u32> {
        match self {
            Loose::Num(n) if n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(n) => {
                Some(*n as u32)
            }
            Loose::Num(_) => None,
            Loose::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_hours(&self) -> Option<f64> {
        match self {
            Loose::Num(n) => Some(*n),
            Loose::Text(s) => parse_clock(s),
        }
    }
}

/// One raw row of an observations file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    pub y: Option<Loose>,
    pub m: Option<Loose>,
    pub d: Option<Loose>,
    pub yday: Loose,
    pub srise: Option<Loose>,
    pub sset: Option<Loose>,
    pub solnoon: Option<Loose>,
    /// Only cross-checked; day length is recomputed from sunrise and sunset
    #[serde(default)]
    pub daylen: Option<Loose>,
}

impl RawObservation {
    /// Calendar date from `y`/`m`/`d`, when all three are present and valid.
    fn calendar_date(&self) -> Option<NaiveDate> {
        let y = self.y.as_ref()?.as_day()?;
        let m = self.m.as_ref()?.as_day()?;
        let d = self.d.as_ref()?.as_day()?;
        NaiveDate::from_ymd_opt(i32::try_from(y).ok()?, m, d)
    }
}

/// A normalized observation, all times in fractional hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "Day Number")]
    pub yday: u32,
    #[serde(rename = "Sunrise Hour")]
    pub sunrise: f64,
    #[serde(rename = "Sunset Hour")]
    pub sunset: f64,
    #[serde(rename = "Daylight Length")]
    pub day_length: f64,
    #[serde(rename = "Solar Noon Time")]
    pub solar_noon: f64,
}

impl Observation {
    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Sunrise => self.sunrise,
            Quantity::Sunset => self.sunset,
            Quantity::SolarNoon => self.solar_noon,
            Quantity::DayLength => self.day_length,
        }
    }
}

fn required_hours(field: Option<&Loose>, name: &str, index: usize) -> Result<f64> {
    let value = field.ok_or_else(|| SunfitError::Observation {
        index,
        reason: format!("missing {}", name),
    })?;
    value.as_hours().ok_or_else(|| SunfitError::Observation {
        index,
        reason: format!("unreadable {}: {:?}", name, value),
    })
}

/// Normalize raw rows into observations.
pub fn normalize(raw: &[RawObservation]) -> Result<Vec<Observation>> {
    raw.iter()
        .enumerate()
        .map(|(index, r)| {
            let yday = r.yday.as_day().ok_or_else(|| SunfitError::Observation {
                index,
                reason: format!("unreadable yday: {:?}", r.yday),
            })?;
            let sunrise = required_hours(r.srise.as_ref(), "srise", index)?;
            let sunset = required_hours(r.sset.as_ref(), "sset", index)?;
            let solar_noon = required_hours(r.solnoon.as_ref(), "solnoon", index)?;
            let day_length = sunset - sunrise;

            if let Some(date) = r.calendar_date()
                && day_of_year(date) != yday
            {
                tracing::warn!(index, %date, yday, "yday does not match the calendar date");
            }
            if let Some(supplied) = r.daylen.as_ref().and_then(Loose::as_hours)
                && (supplied - day_length).abs() > 1.0 / 60.0
            {
                tracing::debug!(index, supplied, day_length, "replacing supplied day length");
            }

            Ok(Observation { yday, sunrise, sunset, day_length, solar_noon })
        })
        .collect()
}

/// Read and normalize an observations file (a JSON array of rows).
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let raw = fs::read_to_string(path).map_err(|e| SunfitError::io(path, e))?;
    let rows: Vec<RawObservation> =
        serde_json::from_str(&raw).map_err(|e| SunfitError::json(path, e))?;
    let observations = normalize(&rows)?;
    tracing::debug!(file = %path.display(), rows = observations.len(), "loaded observations");
    Ok(observations)
}

/// Write observations as pretty JSON with human-readable keys.
pub fn write_transformed(path: &Path, observations: &[Observation]) -> Result<()> {
    let json = serde_json::to_string_pretty(observations).map_err(|e| SunfitError::json(path, e))?;
    fs::write(path, json).map_err(|e| SunfitError::io(path, e))?;
    tracing::info!(file = %path.display(), rows = observations.len(), "wrote transformed observations");
    Ok(())
}

// ===================== EXTREMES =====================

/// Running minimum and maximum of one quantity, with the day each occurred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremes {
    pub min: f64,
    pub min_day: u32,
    pub max: f64,
    pub max_day: u32,
}

impl Default for Extremes {
    fn default() -> Self {
        Self { min: f64::MAX, min_day: 0, max: f64::MIN, max_day: 0 }
    }
}

impl Extremes {
    pub fn update(&mut self, value: f64, yday: u32) {
        if value < self.min {
            self.min = value;
            self.min_day = yday;
        }
        if value > self.max {
            self.max = value;
            self.max_day = yday;
        }
    }

    pub fn midline(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Fit a sine with `period_multiplier` cycles per year through `points`.
    ///
    /// `points` are `(value, yday)` pairs in day order. Empty input yields an
    /// all-zero fit.
    pub fn fit(&self, points: &[(f64, u32)], period_multiplier: f64) -> CurveFit {
        let Some(&first) = points.first() else {
            return CurveFit::default();
        };

        let amplitude = (self.max - self.min) / 2.0;
        let midline = self.midline();
        let angular_frequency = period_multiplier * 2.0 * PI / YEAR_DAYS;

        // First point closest to the midline, and the slope arriving at it
        let mut closest = first;
        let mut closest_slope = 0.0;
        let mut previous = first;
        for &point in points {
            let gap = f64::from(point.1) - f64::from(previous.1);
            let slope = if gap == 0.0 { 0.0 } else { (point.0 - previous.0) / gap };
            previous = point;
            if (point.0 - midline).abs() < (closest.0 - midline).abs() {
                closest = point;
                closest_slope = slope;
            }
        }

        let half_period = YEAR_DAYS / (2.0 * period_multiplier);
        let mut shift = f64::from(closest.1);
        if shift > YEAR_DAYS / 2.0 && shift < YEAR_DAYS {
            shift = if closest_slope > 0.0 { shift - half_period } else { half_period - shift };
        }
        if closest_slope >= 0.01 {
            shift = -shift;
        }
        tracing::debug!(?closest, shift, slope = closest_slope, "phase from midline crossing");

        // `shift` counts days of a k-cycle year; the phase term is scaled by 2π/365 only
        CurveFit {
            amplitude,
            angular_frequency,
            phase_offset: shift * period_multiplier,
            vertical_offset: midline,
        }
    }
}

// ===================== FIT ALL QUANTITIES =====================

/// Solar noon completes two cycles a year; the other quantities one.
pub fn period_multiplier(quantity: Quantity) -> f64 {
    match quantity {
        Quantity::SolarNoon => 2.0,
        _ => 1.0,
    }
}

/// Extremes and fitted curve for one quantity.
#[derive(Debug, Clone, Copy)]
pub struct QuantityFit {
    pub quantity: Quantity,
    pub extremes: Extremes,
    pub curve: CurveFit,
}

/// Fit all four quantities from a set of observations.
pub fn fit_all(observations: &[Observation]) -> [QuantityFit; 4] {
    Quantity::ALL.map(|quantity| {
        let points: Vec<(f64, u32)> =
            observations.iter().map(|o| (o.value(quantity), o.yday)).collect();
        let mut extremes = Extremes::default();
        for &(value, yday) in &points {
            extremes.update(value, yday);
        }
        let curve = extremes.fit(&points, period_multiplier(quantity));
        QuantityFit { quantity, extremes, curve }
    })
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn extremes_of(points: &[(f64, u32)]) -> Extremes {
        let mut e = Extremes::default();
        for &(v, d) in points {
            e.update(v, d);
        }
        e
    }

    #[test]
    fn test_extremes_first_occurrence_wins() {
        let e = extremes_of(&[(5.0, 1), (3.0, 2), (9.0, 3), (3.0, 4), (9.0, 5)]);
        assert_eq!(e, Extremes { min: 3.0, min_day: 2, max: 9.0, max_day: 3 });
        assert_eq!(e.midline(), 6.0);
    }

    #[test]
    fn test_fit_rising_crossing() {
        let points = [(10.0, 1), (12.0, 91), (14.0, 182), (12.0, 273)];
        let fit = extremes_of(&points).fit(&points, 1.0);

        assert_eq!(fit.amplitude, 2.0);
        assert_eq!(fit.vertical_offset, 12.0);
        assert_abs_diff_eq!(fit.angular_frequency, 2.0 * PI / 365.0, epsilon = 1e-15);
        // Rising through the midline on day 91
        assert_eq!(fit.phase_offset, -91.0);
        assert_abs_diff_eq!(fit.evaluate(91.0), 12.0, epsilon = 1e-12);
        assert!(fit.evaluate(92.0) > 12.0);
    }

    #[test]
    fn test_fit_falling_crossing_late_in_year() {
        let points = [(14.0, 1), (13.0, 100), (10.0, 200), (12.0, 250)];
        let fit = extremes_of(&points).fit(&points, 1.0);
        // Closest to midline 12 is day 250 with slope +0.04, so shift = 250 - 182.5, negated
        assert_abs_diff_eq!(fit.phase_offset, -(250.0 - 182.5), epsilon = 1e-12);
    }

    #[test]
    fn test_fit_falling_slope_keeps_sign() {
        let points = [(14.0, 1), (12.5, 60), (10.0, 150)];
        let fit = extremes_of(&points).fit(&points, 1.0);
        // Closest to midline 12 is day 60, slope -1.5/59 is below the flip threshold
        assert_eq!(fit.phase_offset, 60.0);
    }

    #[test]
    fn test_two_cycle_fit_tracks_its_data() {
        let observations: Vec<Observation> = (1..=365)
            .map(|yday| {
                let x = f64::from(yday) * 2.0 * PI / 365.0;
                Observation {
                    yday,
                    sunrise: 6.5,
                    sunset: 18.5,
                    day_length: 12.0,
                    solar_noon: 12.3 + 0.2 * (2.0 * x + 0.3).sin(),
                }
            })
            .collect();
        let noon = fit_all(&observations)[2];
        assert_eq!(noon.quantity, Quantity::SolarNoon);
        // Crossing found on day 173.75 of the half-year period, doubled into the phase term
        assert_abs_diff_eq!(noon.curve.phase_offset, -347.5, epsilon = 1e-9);

        let sq_err: f64 = observations
            .iter()
            .map(|o| (noon.curve.evaluate(f64::from(o.yday)) - o.solar_noon).powi(2))
            .sum();
        let rms = (sq_err / observations.len() as f64).sqrt();
        assert!(rms < 0.01, "solar noon fit rms {rms}");
    }

    #[test]
    fn test_phase_scales_with_cycles_per_year() {
        let points = [(10.0, 1), (12.0, 91), (14.0, 182), (12.0, 273)];
        let one = extremes_of(&points).fit(&points, 1.0);
        let two = extremes_of(&points).fit(&points, 2.0);
        assert_eq!(one.phase_offset, -91.0);
        assert_eq!(two.phase_offset, -182.0);
    }

    #[test]
    fn test_fit_empty() {
        assert_eq!(Extremes::default().fit(&[], 1.0), CurveFit::default());
    }

    #[test]
    fn test_fit_repeated_day_has_no_slope() {
        let points = [(10.0, 5), (12.0, 5), (14.0, 6)];
        let fit = extremes_of(&points).fit(&points, 1.0);
        assert_eq!(fit.phase_offset, 5.0);
    }

    #[test]
    fn test_normalize_mixed_inputs() {
        let rows: Vec<RawObservation> = serde_json::from_str(
            r#"[
                {"y": "2024", "m": "1", "d": "1", "yday": "1", "srise": "7:58", "sset": "16:29", "solnoon": "12:13"},
                {"y": 2024, "m": 1, "d": 2, "yday": 2, "srise": 7.95, "sset": 16.5, "solnoon": 12.22, "daylen": "99:00"}
            ]"#,
        )
        .unwrap();
        let obs = normalize(&rows).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].yday, 1);
        assert_abs_diff_eq!(obs[0].sunrise, 7.0 + 58.0 / 60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(obs[0].day_length, (16.0 + 29.0 / 60.0) - (7.0 + 58.0 / 60.0), epsilon = 1e-12);
        // Supplied day length is recomputed
        assert_abs_diff_eq!(obs[1].day_length, 16.5 - 7.95, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_rejects_missing_sunset() {
        let rows: Vec<RawObservation> = serde_json::from_str(
            r#"[{"yday": 1, "srise": "7:58", "sset": "16:29", "solnoon": "12:13"},
                {"yday": 2, "srise": "7:57", "solnoon": "12:13"}]"#,
        )
        .unwrap();
        let err = normalize(&rows).unwrap_err();
        assert!(matches!(err, SunfitError::Observation { index: 1, .. }));
    }

    #[test]
    fn test_normalize_rejects_out_of_range_yday() {
        let rows: Vec<RawObservation> = serde_json::from_str(
            r#"[{"yday": 1e12, "srise": "7:58", "sset": "16:29", "solnoon": "12:13"}]"#,
        )
        .unwrap();
        assert!(matches!(normalize(&rows), Err(SunfitError::Observation { index: 0, .. })));

        let rows: Vec<RawObservation> = serde_json::from_str(
            r#"[{"yday": -3, "srise": "7:58", "sset": "16:29", "solnoon": "12:13"}]"#,
        )
        .unwrap();
        assert!(matches!(normalize(&rows), Err(SunfitError::Observation { index: 0, .. })));
    }

    #[test]
    fn test_normalize_rejects_bad_clock() {
        let rows: Vec<RawObservation> =
            serde_json::from_str(r#"[{"yday": 1, "srise": "dawn", "sset": "16:29", "solnoon": "12:13"}]"#)
                .unwrap();
        assert!(matches!(normalize(&rows), Err(SunfitError::Observation { index: 0, .. })));
    }

    #[test]
    fn test_fit_all_uses_two_cycles_for_noon() {
        let observations: Vec<Observation> = (1..=365)
            .map(|yday| {
                let x = f64::from(yday) * 2.0 * PI / 365.0;
                let sunrise = 6.5 + x.sin();
                let sunset = 18.5 - x.sin();
                Observation {
                    yday,
                    sunrise,
                    sunset,
                    day_length: sunset - sunrise,
                    solar_noon: 12.3 + 0.2 * (2.0 * x).sin(),
                }
            })
            .collect();
        let fits = fit_all(&observations);

        assert_eq!(fits[2].quantity, Quantity::SolarNoon);
        assert_abs_diff_eq!(fits[2].curve.angular_frequency, 4.0 * PI / 365.0, epsilon = 1e-15);
        assert_abs_diff_eq!(fits[0].curve.angular_frequency, 2.0 * PI / 365.0, epsilon = 1e-15);
        assert_abs_diff_eq!(fits[0].curve.amplitude, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fits[0].curve.vertical_offset, 6.5, epsilon = 1e-3);
        assert_abs_diff_eq!(fits[3].curve.amplitude, 2.0, epsilon = 1e-3);
        assert_eq!(fits[0].extremes.max_day, 91);
    }

    #[test]
    fn test_write_transformed_keys() {
        let path = std::env::temp_dir().join(format!("sunfit-{}-transformed.json", std::process::id()));
        let obs = [Observation { yday: 45, sunrise: 7.25, sunset: 17.5, day_length: 10.25, solar_noon: 12.4 }];
        write_transformed(&path, &obs).unwrap();
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(written[0]["Day Number"], 45);
        assert_eq!(written[0]["Sunrise Hour"], 7.25);
        assert_eq!(written[0]["Daylight Length"], 10.25);
        assert_eq!(written[0]["Solar Noon Time"], 12.4);
    }
}
