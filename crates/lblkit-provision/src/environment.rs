//! Environment advertising for downstream consumers.
//!
//! Pipelines that drive the provisioned toolchain find it through the
//! `TELLURICMODELING` variable. Advertising appends an export line to the
//! shell profile (once) and exports the variable into this process.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lblkit_core::config::set_env_var;

/// The variable downstream tooling reads the install root from.
pub const ENV_KEY: &str = "TELLURICMODELING";

/// The advertised variable: key, and install root with a trailing slash.
#[derive(Debug, Clone)]
pub struct EnvironmentRecord {
    pub key: String,
    pub value: String,
}

impl EnvironmentRecord {
    pub fn for_root(install_root: &Path) -> Self {
        EnvironmentRecord {
            key: ENV_KEY.to_string(),
            value: format!("{}/", install_root.display()),
        }
    }

    /// The line persisted to the shell profile.
    pub fn export_line(&self) -> String {
        format!("export {}={}", self.key, self.value)
    }
}

/// `~/.bashrc`, where the export line lands unless overridden.
pub fn default_profile() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bashrc"))
}

/// Build the advertisement for `install_root` and, when `auto_apply` is
/// set, persist it to the shell profile and export it into this process.
///
/// A relative root is resolved first; the persisted line must stay valid
/// from any working directory.
pub fn advertise(
    install_root: &Path,
    profile: Option<&Path>,
    auto_apply: bool,
) -> io::Result<EnvironmentRecord> {
    let root = if install_root.is_absolute() {
        install_root.to_path_buf()
    } else {
        install_root.canonicalize()?
    };
    let record = EnvironmentRecord::for_root(&root);
    if auto_apply {
        let profile = match profile {
            Some(path) => path.to_path_buf(),
            None => default_profile().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "home directory not found")
            })?,
        };
        apply(&record, &profile)?;
    }
    Ok(record)
}

/// Append the export line to `profile` unless an identical line is already
/// there, then export the variable into the current process.
pub fn apply(record: &EnvironmentRecord, profile: &Path) -> io::Result<()> {
    let line = record.export_line();
    let existing = match fs::read_to_string(profile) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };

    if existing.lines().any(|l| l == line) {
        tracing::info!(profile = %profile.display(), "export line already present");
    } else {
        let mut file = OpenOptions::new().create(true).append(true).open(profile)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            writeln!(file)?;
        }
        writeln!(file, "{}", line)?;
        tracing::info!(profile = %profile.display(), "export line appended");
    }

    set_env_var(&record.key, &record.value);
    Ok(())
}
