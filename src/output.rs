//! Output Formatting Module
//!
//! Provides terminal output for prediction reports, location listings, and
//! curve-fit summaries.

use std::io::{self, Write};

use crate::fitting::QuantityFit;
use crate::profile::ProfileStore;
use crate::report::{Quantity, Report};
use crate::time::format_hour;

// ===================== PREDICTION REPORT =====================

/// Write a prediction report.
///
/// Layout: one header line, four predicted clock values, four differences,
/// and the mean difference.
pub fn write_report<W: Write>(w: &mut W, report: &Report) -> io::Result<()> {
    let place = match &report.name {
        Some(name) => format!("{} ({})", name, report.location),
        None => report.location.clone(),
    };
    writeln!(
        w,
        "Predictions for {} on {}, day {} of {}",
        place,
        report.date.format("%Y-%m-%d"),
        report.day,
        report.year()
    )?;

    for q in Quantity::ALL {
        writeln!(w, "{:<12}: {}", q.label(), format_hour(report.prediction(q).predicted))?;
    }
    for p in &report.predictions {
        writeln!(
            w,
            "{:<22}: {} minutes",
            format!("{} difference", p.quantity.label()),
            p.diff_minutes()
        )?;
    }
    writeln!(w, "{:<22}: {} minutes", "Mean difference", report.mean_diff_minutes())
}

// ===================== LOCATIONS =====================

/// Write known location keys with their display names.
pub fn write_locations<W: Write>(w: &mut W, store: &ProfileStore) -> io::Result<()> {
    for (key, profile) in store.iter() {
        match &profile.name {
            Some(name) => writeln!(w, "{:<12} {}", key, name)?,
            None => writeln!(w, "{}", key)?,
        }
    }
    Ok(())
}

// ===================== FIT SUMMARY =====================

/// Write extremes and fitted curves for all four quantities.
pub fn write_fits<W: Write>(w: &mut W, fits: &[QuantityFit]) -> io::Result<()> {
    for f in fits {
        let e = &f.extremes;
        writeln!(
            w,
            "Min/Max {}: {:.4} (day {}) - {:.4} (day {})",
            f.quantity, e.min, e.min_day, e.max, e.max_day
        )?;
    }
    writeln!(w, "---")?;
    for f in fits {
        writeln!(w, "{:<12}: {}", f.quantity.label(), f.curve)?;
    }
    Ok(())
}

// ===================== TESTS =====================
