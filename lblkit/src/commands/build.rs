//! `lblkit build`: unpack the vendor archives and compile the solvers.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use lblkit_core::config::{ObservabilityConfig, SetupConfig};
use lblkit_provision::process::SystemRunner;
use lblkit_provision::{artifacts, compiler};

use crate::observability;

pub fn cmd_build(root: Option<PathBuf>) -> Result<()> {
    let cfg = SetupConfig::from_env().with_cli_overrides(root, None, None, None, None)?;
    let quiet = ObservabilityConfig::from_env().quiet;
    let runner = SystemRunner;

    let compiler_profile = compiler::resolve_host(&runner)?;
    if !quiet {
        eprintln!(
            "🔨 Building LNFL and LBLRTM with {} in {}",
            compiler_profile.token(),
            cfg.root.display()
        );
    }
    let solvers = artifacts::build(&cfg.root, &compiler_profile, &runner)?;
    if !quiet {
        eprintln!("✅ Solvers built:");
        eprintln!("  • {}", solvers.lnfl_dir.display());
        eprintln!("  • {}", solvers.lblrtm_dir.display());
    }
    observability::audit_stage_completed(
        "build",
        json!({
            "token": compiler_profile.token(),
            "lnfl_dir": solvers.lnfl_dir.display().to_string(),
            "lblrtm_dir": solvers.lblrtm_dir.display().to_string(),
        }),
    );
    Ok(())
}
