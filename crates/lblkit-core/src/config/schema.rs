//! Configuration schema assembled from the environment.

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::spectral::{RangeError, SpectralRange, DEFAULT_WAVE_END_NM, DEFAULT_WAVE_START_NM};

use super::env_keys::{advertise, install, observability, range, rundirs};
use super::loader::{self, env_bool, env_optional, env_or};

/// Default number of run directories.
pub const DEFAULT_RUNDIR_COUNT: usize = 4;

/// Template directory name under the install root.
pub const DEFAULT_TEMPLATE_DIR: &str = "data";

/// Everything the provisioning pipeline needs, resolved up front.
///
/// Precedence is CLI flag over environment over default. The environment
/// side lives here; flags arrive via [`SetupConfig::with_cli_overrides`].
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Install root holding archives, build trees and run directories.
    pub root: PathBuf,
    /// Wavelength window the line database must cover.
    pub range: SpectralRange,
    /// How many isolated run directories to provision.
    pub rundir_count: usize,
    /// Template directory override; `None` means `<root>/data`.
    pub template_dir: Option<PathBuf>,
    /// Shell profile override; `None` means `~/.bashrc`.
    pub profile: Option<PathBuf>,
    /// Append the export line to the shell profile during setup.
    pub apply_env: bool,
}

impl SetupConfig {
    pub fn from_env() -> Self {
        loader::load_dotenv();

        let root = env_optional(install::LBLKIT_ROOT, install::ROOT_ALIASES)
            .map(PathBuf::from)
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let start = env_optional(range::LBLKIT_WAVE_START, &[])
            .and_then(|raw| loader::positive_f64(range::LBLKIT_WAVE_START, &raw))
            .unwrap_or(DEFAULT_WAVE_START_NM);
        let end = env_optional(range::LBLKIT_WAVE_END, &[])
            .and_then(|raw| loader::positive_f64(range::LBLKIT_WAVE_END, &raw))
            .unwrap_or(DEFAULT_WAVE_END_NM);
        let range = SpectralRange::new(start, end).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring wavelength range from environment");
            SpectralRange::default()
        });

        let rundir_count = env_optional(rundirs::LBLKIT_RUNDIRS, &[])
            .and_then(|raw| loader::positive_usize(rundirs::LBLKIT_RUNDIRS, &raw))
            .unwrap_or(DEFAULT_RUNDIR_COUNT);

        let template_dir = env_optional(rundirs::LBLKIT_TEMPLATE_DIR, &[]).map(PathBuf::from);
        let profile = env_optional(advertise::LBLKIT_PROFILE, &[]).map(PathBuf::from);

        Self {
            root,
            range,
            rundir_count,
            template_dir,
            profile,
            apply_env: false,
        }
    }

    /// Apply CLI flags on top; flags win over the environment.
    pub fn with_cli_overrides(
        mut self,
        root: Option<PathBuf>,
        wave_start: Option<f64>,
        wave_end: Option<f64>,
        rundir_count: Option<usize>,
        template_dir: Option<PathBuf>,
    ) -> Result<Self, RangeError> {
        if let Some(root) = root {
            self.root = root;
        }
        if wave_start.is_some() || wave_end.is_some() {
            self.range = SpectralRange::new(
                wave_start.unwrap_or_else(|| self.range.start_nm()),
                wave_end.unwrap_or_else(|| self.range.end_nm()),
            )?;
        }
        if let Some(count) = rundir_count {
            if count == 0 {
                tracing::warn!("ignoring a run directory count of zero");
            } else {
                self.rundir_count = count;
            }
        }
        if let Some(dir) = template_dir {
            self.template_dir = Some(dir);
        }
        Ok(self)
    }

    /// Effective template directory.
    pub fn templates(&self) -> PathBuf {
        self.template_dir
            .clone()
            .unwrap_or_else(|| self.root.join(DEFAULT_TEMPLATE_DIR))
    }
}

/// Observability switches, read once per process.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Suppress step progress; only warnings and errors get logged.
    pub quiet: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit tracing output as JSON.
    pub log_json: bool,
    /// Audit log path; `None` disables the audit trail.
    pub audit_log: Option<PathBuf>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            loader::load_dotenv();
            ObservabilityConfig {
                quiet: env_bool(observability::LBLKIT_QUIET, &[], false),
                log_level: env_or(observability::LBLKIT_LOG_LEVEL, &[], || {
                    "lblkit=info".to_string()
                }),
                log_json: env_bool(observability::LBLKIT_LOG_JSON, &[], false),
                audit_log: env_optional(observability::LBLKIT_AUDIT_LOG, &[]).map(PathBuf::from),
            }
        })
    }
}
