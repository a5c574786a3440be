//! `lblkit tape3`: generate the line database on its own.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use lblkit_core::config::{ObservabilityConfig, SetupConfig};
use lblkit_provision::process::SystemRunner;
use lblkit_provision::tape3;

use crate::observability;

pub fn cmd_tape3(root: Option<PathBuf>, wave_start: Option<f64>, wave_end: Option<f64>) -> Result<()> {
    let cfg =
        SetupConfig::from_env().with_cli_overrides(root, wave_start, wave_end, None, None)?;
    let quiet = ObservabilityConfig::from_env().quiet;
    let runner = SystemRunner;

    let (lower, upper) = cfg.range.wavenumber_bounds();
    if !quiet {
        eprintln!(
            "⏳ Generating the line database for {:.3} .. {:.3} cm^-1 (this can take a while)...",
            lower, upper
        );
    }
    let database = tape3::generate(&cfg.root, &cfg.range, &runner)?;
    if !quiet {
        if database.freshly_built {
            eprintln!("✅ Line database written to {}", database.path.display());
        } else {
            eprintln!(
                "⏭ Line database already present at {}",
                database.path.display()
            );
        }
    }
    observability::audit_stage_completed(
        "tape3",
        json!({
            "path": database.path.display().to_string(),
            "freshly_built": database.freshly_built,
        }),
    );
    Ok(())
}
