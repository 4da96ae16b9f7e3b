use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod curve;
mod error;
mod fitting;
mod output;
mod plot;
mod profile;
mod report;
mod time;

use cli::{Args, DepInfo};
use error::{Result, SunfitError};
use profile::ProfileStore;
use report::Report;
use time::{parse_date, system_timezone};

// ===================== MAIN =====================

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let stdout = io::stdout();
    match run(args, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by RUST_LOG (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn stdout_err(e: io::Error) -> SunfitError {
    SunfitError::io("<stdout>", e)
}

fn run<W: Write>(args: Args, out: &mut W) -> Result<()> {
    if args.show_build_info {
        return write_build_info(out);
    }

    if let Some(observations) = &args.fit {
        let chart = args.plot.as_deref().map(|path| {
            (path, args.label.as_deref().unwrap_or(plot::DEFAULT_TITLE))
        });
        return run_fit(out, observations, args.transformed.as_deref(), chart);
    }

    let store = match &args.profiles {
        Some(path) => ProfileStore::load(path)?,
        None => ProfileStore::builtin(),
    };

    if args.list_locations {
        return output::write_locations(out, &store).map_err(stdout_err);
    }

    // clap enforces --location outside the auxiliary modes
    let location = args.location.as_deref().unwrap_or_default();

    // Resolve the location before touching anything else so a bad key fails first
    if let Err(e) = store.get(location) {
        eprintln!("Known locations: {}", store.keys().collect::<Vec<_>>().join(", "));
        return Err(e);
    }

    let date = parse_date(&args.date, system_timezone())?;
    let report = Report::compute(&store, location, date)?;
    output::write_report(out, &report).map_err(stdout_err)
}

// ===================== FITTING =====================

fn run_fit<W: Write>(
    out: &mut W,
    observations: &Path,
    transformed: Option<&Path>,
    chart: Option<(&Path, &str)>,
) -> Result<()> {
    let data = fitting::load_observations(observations)?;
    if data.is_empty() {
        tracing::warn!(file = %observations.display(), "no observations; fits will be empty");
    }

    if let Some(path) = transformed {
        fitting::write_transformed(path, &data)?;
    }

    let fits = fitting::fit_all(&data);
    output::write_fits(out, &fits).map_err(stdout_err)?;

    if let Some((path, title)) = chart {
        plot::draw_chart(path, title, &data, &fits)?;
    }
    Ok(())
}

// ===================== BUILD INFO =====================

fn write_build_info<W: Write>(out: &mut W) -> Result<()> {
    const DEP_INFO_RAW: &str = include_str!(env!("DEPS_INFO_PATH"));
    let deps: Vec<DepInfo> =
        serde_json::from_str(DEP_INFO_RAW).map_err(|e| SunfitError::json(env!("DEPS_INFO_PATH"), e))?;

    writeln!(out, "Built from Git commit: {}\n", env!("APP_GIT_HASH")).map_err(stdout_err)?;
    writeln!(out, "Found {} dependencies.", deps.len()).map_err(stdout_err)?;
    for dep in deps {
        writeln!(out, "- {} v{}", dep.name, dep.version).map_err(stdout_err)?;
        if let Some(sum) = dep.checksum {
            writeln!(out, "    Checksum: {}", sum).map_err(stdout_err)?;
        }
        if let Some(src) = dep.source {
            writeln!(out, "    Source:   {}", src).map_err(stdout_err)?;
        }
    }
    Ok(())
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(argv: &[&str]) -> (Result<()>, String) {
        let args = Args::try_parse_from(argv).unwrap();
        let mut buf = Vec::new();
        let result = run(args, &mut buf);
        (result, String::from_utf8(buf).unwrap())
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sunfit-main-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_unknown_location_prints_nothing() {
        let (result, text) = run_to_string(&["sunfit", "-l", "atlantis"]);
        assert!(matches!(result, Err(SunfitError::UnknownLocation(k)) if k == "atlantis"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_unknown_location_fails_before_bad_date() {
        let (result, text) = run_to_string(&["sunfit", "-l", "atlantis", "--date", "garbage"]);
        assert!(matches!(result, Err(SunfitError::UnknownLocation(_))));
        assert!(text.is_empty());
    }

    #[test]
    fn test_known_location_prints_report() {
        let (result, text) = run_to_string(&["sunfit", "-l", "seattle"]);
        result.unwrap();
        assert_eq!(text.lines().count(), 10);
        assert!(text.contains("Sunrise     : 7:22"));
    }

    #[test]
    fn test_list_locations() {
        let (result, text) = run_to_string(&["sunfit", "--list-locations"]);
        result.unwrap();
        assert!(text.starts_with("seattle"));
        assert!(text.contains("tucson"));
    }

    #[test]
    fn test_fit_takes_precedence_over_location() {
        let obs = temp_path("obs.json");
        let chart = temp_path("chart.svg");
        let rows: Vec<String> = (1..=365)
            .step_by(30)
            .map(|d| {
                let x = d as f64 * 2.0 * std::f64::consts::PI / 365.0;
                format!(
                    r#"{{"yday": {}, "srise": {}, "sset": {}, "solnoon": {}}}"#,
                    d,
                    6.5 + x.cos(),
                    18.0 - x.cos(),
                    12.3 + 0.2 * (2.0 * x).sin()
                )
            })
            .collect();
        std::fs::write(&obs, format!("[{}]", rows.join(","))).unwrap();

        let (result, text) = run_to_string(&[
            "sunfit",
            "-l",
            "atlantis",
            "--fit",
            obs.to_str().unwrap(),
            "--plot",
            chart.to_str().unwrap(),
        ]);
        let svg = std::fs::read_to_string(&chart);
        std::fs::remove_file(&obs).ok();
        std::fs::remove_file(&chart).ok();

        result.unwrap();
        assert!(text.starts_with("Min/Max Sunrise:"));
        assert!(!text.contains("Predictions for"));
        assert!(svg.unwrap().contains(plot::DEFAULT_TITLE));
    }
}
