//! `lblkit setup`: the full provisioning pipeline, with progress.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use lblkit_core::config::{ObservabilityConfig, SetupConfig};
use lblkit_provision::process::SystemRunner;
use lblkit_provision::setup::{run_setup, SetupReport, StageOutcome};

use crate::observability;

pub fn cmd_setup(
    root: Option<PathBuf>,
    wave_start: Option<f64>,
    wave_end: Option<f64>,
    rundir_count: Option<usize>,
    template_dir: Option<PathBuf>,
    apply_env: bool,
    profile: Option<PathBuf>,
) -> Result<()> {
    let mut cfg = SetupConfig::from_env().with_cli_overrides(
        root,
        wave_start,
        wave_end,
        rundir_count,
        template_dir,
    )?;
    if profile.is_some() {
        cfg.profile = profile;
    }
    cfg.apply_env = apply_env;

    let quiet = ObservabilityConfig::from_env().quiet;
    if !quiet {
        eprintln!(
            "🚀 Provisioning the LBLRTM toolchain in {}",
            cfg.root.display()
        );
        eprintln!();
    }

    let report = run_setup(&cfg, &SystemRunner, |outcome| {
        if !quiet {
            announce(&outcome, apply_env);
        }
        observability::audit_stage_completed(outcome.name(), stage_detail(&outcome, apply_env));
    })?;

    if !quiet {
        print_summary(&cfg, &report);
    }
    Ok(())
}

/// Progress line for a finished stage, plus the heads-up for the slow
/// stage that follows it.
fn announce(outcome: &StageOutcome<'_>, apply_env: bool) {
    match outcome {
        StageOutcome::CompilerResolved(profile) => {
            eprintln!(
                "✅ Step 1/5: Fortran compiler resolved ({})",
                profile.token()
            );
            eprintln!("📦 Step 2/5: Unpacking archives and building the solvers...");
        }
        StageOutcome::SolversBuilt(_) => {
            eprintln!("✅ Step 2/5: LNFL and LBLRTM built");
            eprintln!("⏳ Step 3/5: Generating the line database (this can take a while)...");
        }
        StageOutcome::DatabaseReady(database) => {
            if database.freshly_built {
                eprintln!(
                    "✅ Step 3/5: Line database generated at {}",
                    database.path.display()
                );
            } else {
                eprintln!("⏭ Step 3/5: Line database already present, skipped");
            }
        }
        StageOutcome::RundirsProvisioned(rundirs) => {
            eprintln!("✅ Step 4/5: {} run directories provisioned", rundirs.len());
        }
        StageOutcome::EnvironmentAdvertised(record) => {
            if apply_env {
                eprintln!(
                    "✅ Step 5/5: {} exported and persisted to the shell profile",
                    record.key
                );
            } else {
                eprintln!(
                    "✅ Step 5/5: Environment line prepared (rerun with --apply-env to persist)"
                );
            }
        }
    }
}

fn stage_detail(outcome: &StageOutcome<'_>, apply_env: bool) -> serde_json::Value {
    match outcome {
        StageOutcome::CompilerResolved(profile) => json!({ "token": profile.token() }),
        StageOutcome::SolversBuilt(solvers) => json!({
            "lnfl_dir": solvers.lnfl_dir.display().to_string(),
            "lblrtm_dir": solvers.lblrtm_dir.display().to_string(),
        }),
        StageOutcome::DatabaseReady(database) => json!({
            "path": database.path.display().to_string(),
            "freshly_built": database.freshly_built,
        }),
        StageOutcome::RundirsProvisioned(rundirs) => json!({ "count": rundirs.len() }),
        StageOutcome::EnvironmentAdvertised(record) => json!({
            "key": record.key,
            "value": record.value,
            "applied": apply_env,
        }),
    }
}

fn print_summary(cfg: &SetupConfig, report: &SetupReport) {
    let span = match report.rundirs.len() {
        0 => "none".to_string(),
        1 => "rundir1".to_string(),
        n => format!("rundir1 .. rundir{}", n),
    };
    eprintln!();
    eprintln!("{}", "═".repeat(50));
    eprintln!("✅ LBLRTM toolchain ready");
    eprintln!("{}", "═".repeat(50));
    eprintln!("  Install root:  {}", cfg.root.display());
    eprintln!("  Compiler:      {}", report.profile.token());
    eprintln!("  Line database: {}", report.database.path.display());
    eprintln!("  Run dirs:      {}", span);
    eprintln!();
    eprintln!("Next steps:");
    eprintln!("  • {}", report.environment.export_line());
    eprintln!("  • lblkit rundirs --json   (list the run directories)");
    eprintln!("{}", "═".repeat(50));
}
