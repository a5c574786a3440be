//! Environment variable names understood by lblkit.
//!
//! Keys are grouped by the subsystem that consumes them. Aliases exist only
//! where downstream tooling already exports a variable worth honoring.

/// Install root selection.
pub mod install {
    /// Directory holding the vendor archives, build trees and run directories.
    pub const LBLKIT_ROOT: &str = "LBLKIT_ROOT";

    /// Downstream pipelines export this once provisioned; honored as a
    /// fallback when `LBLKIT_ROOT` is unset.
    pub const ROOT_ALIASES: &[&str] = &["TELLURICMODELING"];
}

/// Line database coverage.
pub mod range {
    /// Starting wavelength in nanometres.
    pub const LBLKIT_WAVE_START: &str = "LBLKIT_WAVE_START";

    /// Ending wavelength in nanometres.
    pub const LBLKIT_WAVE_END: &str = "LBLKIT_WAVE_END";
}

/// Run directory provisioning.
pub mod rundirs {
    /// How many isolated run directories to provision.
    pub const LBLKIT_RUNDIRS: &str = "LBLKIT_RUNDIRS";

    /// Directory holding the per-run template files.
    pub const LBLKIT_TEMPLATE_DIR: &str = "LBLKIT_TEMPLATE_DIR";
}

/// Environment advertising.
pub mod advertise {
    /// Shell profile that receives the export line.
    pub const LBLKIT_PROFILE: &str = "LBLKIT_PROFILE";
}

/// Observability switches.
pub mod observability {
    /// Suppress step progress and log only warnings and errors.
    pub const LBLKIT_QUIET: &str = "LBLKIT_QUIET";

    /// Default tracing filter when `RUST_LOG` is unset.
    pub const LBLKIT_LOG_LEVEL: &str = "LBLKIT_LOG_LEVEL";

    /// Emit tracing output as JSON.
    pub const LBLKIT_LOG_JSON: &str = "LBLKIT_LOG_JSON";

    /// Append one JSON line per completed stage to this file.
    pub const LBLKIT_AUDIT_LOG: &str = "LBLKIT_AUDIT_LOG";
}
