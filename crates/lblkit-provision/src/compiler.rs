//! Host platform detection and Fortran compiler resolution.
//!
//! The native makefiles key their flag sets off a profile token such as
//! `linuxGNUsgl`. Resolution probes the known compilers in preference
//! order and combines the first usable one with the host platform.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::process::ProcessRunner;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("unsupported host platform: {0}")]
    UnsupportedPlatform(String),
    #[error("no usable Fortran compiler found (tried ifort, gfortran, g95)")]
    NoCompilerFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Osx,
}

impl Platform {
    /// Map a host identifier such as `std::env::consts::OS` onto a platform.
    pub fn from_host_id(id: &str) -> Result<Self, ResolutionError> {
        if id.contains("linux") {
            Ok(Platform::Linux)
        } else if id == "macos" || id == "darwin" {
            Ok(Platform::Osx)
        } else {
            Err(ResolutionError::UnsupportedPlatform(id.to_string()))
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Osx => "osx",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vendor {
    Intel,
    Gnu,
    G95,
}

impl Vendor {
    pub fn token(self) -> &'static str {
        match self {
            Vendor::Intel => "INTEL",
            Vendor::Gnu => "GNU",
            Vendor::G95 => "G95",
        }
    }
}

/// Probe order encodes the preference: Intel first, then GNU, then g95.
pub const VENDOR_PREFERENCE: &[(Vendor, &str)] = &[
    (Vendor::Intel, "ifort"),
    (Vendor::Gnu, "gfortran"),
    (Vendor::G95, "g95"),
];

/// The platform and compiler a native build is keyed on.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompilerProfile {
    pub platform: Platform,
    pub vendor: Vendor,
}

impl CompilerProfile {
    /// Token consumed by the native makefiles, e.g. `linuxGNUsgl`. Only
    /// single-precision builds are supported, hence the fixed suffix.
    pub fn token(&self) -> String {
        format!("{}{}sgl", self.platform.token(), self.vendor.token())
    }
}

/// Resolve the compiler profile for the current host.
pub fn resolve_host(runner: &dyn ProcessRunner) -> Result<CompilerProfile, ResolutionError> {
    resolve(std::env::consts::OS, runner)
}

/// Resolve a compiler profile for the given host identifier: the first
/// compiler in [`VENDOR_PREFERENCE`] that answers a `--help` probe wins.
pub fn resolve(host_id: &str, runner: &dyn ProcessRunner) -> Result<CompilerProfile, ResolutionError> {
    let platform = Platform::from_host_id(host_id)?;
    for &(vendor, invocation) in VENDOR_PREFERENCE {
        if probe(invocation, runner) {
            tracing::info!(compiler = invocation, "resolved Fortran compiler");
            return Ok(CompilerProfile { platform, vendor });
        }
        tracing::debug!(compiler = invocation, "not invocable, trying next");
    }
    Err(ResolutionError::NoCompilerFound)
}

/// A compiler is usable when its `--help` probe spawns and exits zero.
fn probe(invocation: &str, runner: &dyn ProcessRunner) -> bool {
    matches!(
        runner.run(Path::new(invocation), &["--help"], Path::new("."), None),
        Ok(0)
    )
}
