//! Tracing initialization and the stage audit trail.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use lblkit_core::config::ObservabilityConfig;

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing from the observability config. `RUST_LOG` wins over
/// `LBLKIT_LOG_LEVEL`; quiet drops the default filter to warnings.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "lblkit=warn".to_string()
    } else {
        cfg.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };
}

/// Append one audit line for a completed pipeline stage.
pub fn audit_stage_completed(stage: &str, detail: serde_json::Value) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "event": "stage_completed",
            "stage": stage,
            "detail": detail,
        });
        append_jsonl(&path, &record);
    }
}

fn audit_path() -> Option<String> {
    // Best effort all the way down: a poisoned cache disables the trail.
    let mut guard = AUDIT_PATH.lock().ok()?;
    if guard.is_none() {
        let cfg = ObservabilityConfig::from_env();
        if let Some(path) = &cfg.audit_log {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            *guard = Some(path.display().to_string());
        }
    }
    guard.clone()
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{}", record));
    if let Err(err) = result {
        tracing::warn!(%err, path, "failed to append audit record");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lblkit_core::config::env_keys::observability::LBLKIT_AUDIT_LOG;
    use lblkit_core::config::set_env_var;

    // The audit path resolves once through process-global config, so every
    // audit assertion lives in this single test.
    #[test]
    fn test_audit_trail_is_best_effort_jsonl() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("audit").join("trail.jsonl");
        set_env_var(LBLKIT_AUDIT_LOG, path.to_str().unwrap());

        audit_stage_completed("compiler", json!({ "token": "linuxGNUsgl" }));
        audit_stage_completed("tape3", json!({ "freshly_built": false }));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "stage_completed");
        assert_eq!(first["stage"], "compiler");
        assert_eq!(first["detail"]["token"], "linuxGNUsgl");
        assert!(first["ts"].is_string());
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["stage"], "tape3");
        assert_eq!(second["detail"]["freshly_built"], false);

        // An unwritable target is logged and skipped, never an error.
        append_jsonl(tmp.path().to_str().unwrap(), &json!({ "event": "x" }));

        // A poisoned path cache turns the trail off instead of panicking.
        let _ = std::panic::catch_unwind(|| {
            let _guard = AUDIT_PATH.lock().unwrap();
            panic!("poison the cache");
        });
        audit_stage_completed("environment", json!({}));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
