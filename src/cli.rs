//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for sunfit.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::time::REFERENCE_DATE;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Location key to predict for (e.g. "seattle", "tucson")
    #[arg(
        short,
        long,
        value_parser = parse_location_key,
        env = "SUNFIT_LOCATION",
        required_unless_present_any = ["list_locations", "fit", "show_build_info"]
    )]
    pub location: Option<String>,

    /// Date to predict for (e.g. "2024-02-14" or "today")
    #[arg(long, default_value = REFERENCE_DATE, env = "SUNFIT_DATE")]
    pub date: String,

    /// JSON file with additional or replacement location profiles
    #[arg(long, value_name = "FILE", env = "SUNFIT_PROFILES")]
    pub profiles: Option<PathBuf>,

    /// List known location keys and exit
    #[arg(long)]
    pub list_locations: bool,

    // ===================== FITTING OPTIONS =====================
    /// Fit curves to a JSON file of daily observations instead of predicting
    #[arg(long, value_name = "FILE")]
    pub fit: Option<PathBuf>,

    /// Write the normalized observations to this JSON file (with --fit)
    #[arg(long, value_name = "FILE", requires = "fit")]
    pub transformed: Option<PathBuf>,

    /// Draw observations and fitted curves to this SVG file (with --fit)
    #[arg(long, value_name = "FILE", requires = "fit")]
    pub plot: Option<PathBuf>,

    /// Chart caption (default: "Sun Rise/Set/Noon")
    #[arg(long, value_name = "TEXT", requires = "plot")]
    pub label: Option<String>,

    /// Show build info from Cargo.lock at time of building
    #[arg(long)]
    pub show_build_info: bool,
}

// Define the structure to match what we serialized in build.rs
#[derive(Debug, Deserialize)]
pub struct DepInfo {
    pub name: String,
    pub version: String,
    pub checksum: Option<String>,
    pub source: Option<String>,
}

// ===================== CLI VALUE PARSERS =====================

fn parse_location_key(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Location must not be empty".to_string());
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("Location must not contain whitespace, got '{}'", s));
    }
    Ok(s.to_string())
}

// ===================== TESTS =====================
