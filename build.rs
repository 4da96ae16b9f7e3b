use cargo_lock::Lockfile;
use serde::Serialize;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::Command;

/// One locked package, as embedded for `--show-build-info`.
#[derive(Serialize)]
struct DepInfo {
    name: String,
    version: String,
    checksum: Option<String>,
    source: Option<String>,
}

fn git_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rustc-env=APP_GIT_HASH={}", git_hash());
    println!("cargo:rerun-if-changed=.git/HEAD");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR")?;
    let lock_path = Path::new(&manifest_dir).join("Cargo.lock");
    println!("cargo:rerun-if-changed=Cargo.lock");

    // A lock file is absent when built as a dependency of another workspace
    let deps: Vec<DepInfo> = match Lockfile::load(&lock_path) {
        Ok(lockfile) => lockfile
            .packages
            .into_iter()
            .map(|pkg| DepInfo {
                name: pkg.name.as_str().to_string(),
                version: pkg.version.to_string(),
                checksum: pkg.checksum.map(|c| c.to_string()),
                source: pkg.source.map(|s| s.to_string()),
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    let dest_path = Path::new(&env::var("OUT_DIR")?).join("deps_info.json");
    fs::write(&dest_path, serde_json::to_string(&deps)?)?;
    println!("cargo:rustc-env=DEPS_INFO_PATH={}", dest_path.display());
    Ok(())
}
