//! `lblkit rundirs`: create or refresh the isolated run directories.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use lblkit_core::config::{ObservabilityConfig, SetupConfig};
use lblkit_provision::artifacts::{LBLRTM_DIR, LNFL_DIR};
use lblkit_provision::rundir;
use lblkit_provision::tape3::DATABASE_NAME;

use crate::observability;

pub fn cmd_rundirs(
    root: Option<PathBuf>,
    count: Option<usize>,
    template_dir: Option<PathBuf>,
    json_output: bool,
) -> Result<()> {
    let cfg = SetupConfig::from_env().with_cli_overrides(root, None, None, count, template_dir)?;
    let quiet = ObservabilityConfig::from_env().quiet;

    let solver_dir = cfg.root.join(LBLRTM_DIR);
    let database = cfg.root.join(LNFL_DIR).join(DATABASE_NAME);
    let rundirs = rundir::provision(
        &cfg.root,
        &cfg.templates(),
        cfg.rundir_count,
        &solver_dir,
        &database,
    )?;

    observability::audit_stage_completed("rundirs", json!({ "count": rundirs.len() }));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rundirs)?);
        return Ok(());
    }
    if !quiet {
        eprintln!("📋 Provisioned {} run directories:", rundirs.len());
        for rundir in &rundirs {
            eprintln!("  • rundir{}: {}", rundir.index, rundir.path.display());
        }
    }
    Ok(())
}
