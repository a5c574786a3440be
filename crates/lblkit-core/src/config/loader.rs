//! Environment loading helpers.
//!
//! All process environment mutation funnels through [`set_env_var`] and
//! [`remove_env_var`] so the call that is unsafe on newer toolchains stays
//! in one place.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Once;

static DOTENV: Once = Once::new();

/// Load `./.env` into the process environment, once per process.
pub fn load_dotenv() {
    DOTENV.call_once(|| load_dotenv_from_dir(Path::new(".")));
}

/// Load `<dir>/.env` without the once-guard. A missing file is fine, and
/// variables already present in the environment are never overwritten.
pub fn load_dotenv_from_dir(dir: &Path) {
    let content = match fs::read_to_string(dir.join(".env")) {
        Ok(content) => content,
        Err(_) => return,
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = match line.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };
        let key = key.trim();
        let mut value = value.trim();
        // Strip one layer of quotes; inline comments only count outside quotes.
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        } else if let Some(idx) = value.find(" #") {
            value = value[..idx].trim_end();
        }
        if env::var_os(key).is_none() {
            set_env_var(key, value);
        }
    }
}

/// Read `primary` (or the first alias carrying a non-empty value), else the
/// provided default.
pub fn env_or<F: FnOnce() -> String>(primary: &str, aliases: &[&str], default: F) -> String {
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read `primary` or the first alias carrying a non-empty value.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .filter_map(|key| env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Truthiness used by the `LBLKIT_*` switches: anything but the usual
/// falsey spellings counts as on.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(value) => !matches!(value.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => default,
    }
}

/// Parse a positive float, warning and returning `None` on junk.
pub fn positive_f64(key: &str, raw: &str) -> Option<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Some(value),
        _ => {
            tracing::warn!(key, value = raw, "ignoring non-positive numeric value");
            None
        }
    }
}

/// Parse a positive integer, warning and returning `None` on junk.
pub fn positive_usize(key: &str, raw: &str) -> Option<usize> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(key, value = raw, "ignoring non-positive count");
            None
        }
    }
}

/// Set a process environment variable.
#[allow(unsafe_code)]
pub fn set_env_var(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

/// Remove a process environment variable.
#[allow(unsafe_code)]
pub fn remove_env_var(key: &str) {
    unsafe { env::remove_var(key) };
}
