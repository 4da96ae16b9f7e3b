//! Sinusoidal Curve Model Module
//!
//! A `CurveFit` models one daily solar quantity (sunrise, sunset, solar noon or
//! day length, in fractional hours) as a sine of the day-of-year.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

// ===================== CONSTANTS =====================

/// Days per year used by the phase term.
pub const YEAR_DAYS: f64 = 365.0;

// ===================== TYPES =====================

/// Parameters of `f(day) = a * sin(b * day + c * 2π / 365) + d`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveFit {
    /// Half the peak-to-peak swing, in hours
    #[serde(alias = "a")]
    pub amplitude: f64,
    /// Radians per day
    #[serde(alias = "b")]
    pub angular_frequency: f64,
    /// Phase offset in days, scaled to radians by 2π/365
    #[serde(alias = "c")]
    pub phase_offset: f64,
    /// Midline, in hours
    #[serde(alias = "d")]
    pub vertical_offset: f64,
}

impl CurveFit {
    pub const fn new(
        amplitude: f64,
        angular_frequency: f64,
        phase_offset: f64,
        vertical_offset: f64,
    ) -> Self {
        Self { amplitude, angular_frequency, phase_offset, vertical_offset }
    }

    /// Phase term in radians.
    pub fn phase_radians(&self) -> f64 {
        self.phase_offset * 2.0 * PI / YEAR_DAYS
    }

    /// Evaluate the curve at a (possibly fractional) day-of-year.
    ///
    /// Defined for every real `day`; the result is in hours.
    pub fn evaluate(&self, day: f64) -> f64 {
        self.amplitude * (self.angular_frequency * day + self.phase_radians()).sin()
            + self.vertical_offset
    }
}

impl fmt::Display for CurveFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.phase_offset < 0.0 { '-' } else { '+' };
        write!(
            f,
            "f(x) = {} * sin({} * x {} {:?} * 2 * pi / 365) + {}",
            self.amplitude,
            self.angular_frequency,
            sign,
            self.phase_offset.abs(),
            self.vertical_offset
        )
    }
}

// ===================== TESTS =====================
