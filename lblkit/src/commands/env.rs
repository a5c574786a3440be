//! `lblkit env`: print or persist the environment advertisement.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use lblkit_core::config::{ObservabilityConfig, SetupConfig};
use lblkit_provision::environment;

use crate::observability;

pub fn cmd_env(root: Option<PathBuf>, apply: bool, profile: Option<PathBuf>) -> Result<()> {
    let mut cfg = SetupConfig::from_env().with_cli_overrides(root, None, None, None, None)?;
    if profile.is_some() {
        cfg.profile = profile;
    }
    let quiet = ObservabilityConfig::from_env().quiet;

    let record = environment::advertise(&cfg.root, cfg.profile.as_deref(), apply)?;
    if apply && !quiet {
        match cfg.profile.clone().or_else(environment::default_profile) {
            Some(path) => eprintln!(
                "✅ {} exported and persisted to {}",
                record.key,
                path.display()
            ),
            None => eprintln!("✅ {} exported", record.key),
        }
    }
    // Stdout, so the line can be eval'ed or redirected into a profile.
    println!("{}", record.export_line());

    observability::audit_stage_completed(
        "environment",
        json!({ "key": record.key, "value": record.value, "applied": apply }),
    );
    Ok(())
}
