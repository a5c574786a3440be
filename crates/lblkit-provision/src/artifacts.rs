//! Vendor archive handling and native solver builds.
//!
//! Three upstream archives sit in the install root: the line-file data,
//! the LNFL sources and the LBLRTM sources. Building means unpacking all
//! three and driving each build tree's makefile with the resolved profile
//! token.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use thiserror::Error;

use crate::compiler::CompilerProfile;
use crate::process::ProcessRunner;

/// The vendor source archives expected in the install root.
pub const SOURCE_ARCHIVES: [&str; 3] = [
    "aer_v_3.2.tar.gz",
    "aerlnfl_v2.6.tar.gz",
    "aerlbl_v12.2.tar.gz",
];

/// Directory the LNFL archive unpacks to.
pub const LNFL_DIR: &str = "lnfl";

/// Directory the LBLRTM archive unpacks to.
pub const LBLRTM_DIR: &str = "lblrtm";

/// Build log names, written into the install root.
pub const LNFL_BUILD_LOG: &str = "lnfl_build.log";
pub const LBLRTM_BUILD_LOG: &str = "lblrtm_build.log";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("required archive {0} not found in the install root")]
    MissingArchive(String),
    #[error("failed to extract {archive}")]
    Extraction {
        archive: String,
        #[source]
        source: io::Error,
    },
    #[error("{target} build failed with exit code {code}, see {log}")]
    CompileFailed {
        target: String,
        code: i32,
        log: PathBuf,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where the built solvers ended up.
#[derive(Debug, Clone)]
pub struct SolverArtifacts {
    pub lnfl_dir: PathBuf,
    pub lblrtm_dir: PathBuf,
}

/// Unpack the vendor archives and compile both solvers.
///
/// All three archives are checked before anything is unpacked, so a
/// missing one fails the build with the root untouched.
pub fn build(
    root: &Path,
    profile: &CompilerProfile,
    runner: &dyn ProcessRunner,
) -> Result<SolverArtifacts, BuildError> {
    for name in SOURCE_ARCHIVES {
        if !root.join(name).exists() {
            return Err(BuildError::MissingArchive(name.to_string()));
        }
    }
    for name in SOURCE_ARCHIVES {
        unpack(root, name)?;
    }

    let token = profile.token();
    run_make(root, LNFL_DIR, "make_lnfl", &token, LNFL_BUILD_LOG, runner)?;
    run_make(root, LBLRTM_DIR, "make_lblrtm", &token, LBLRTM_BUILD_LOG, runner)?;

    Ok(SolverArtifacts {
        lnfl_dir: root.join(LNFL_DIR),
        lblrtm_dir: root.join(LBLRTM_DIR),
    })
}

fn unpack(root: &Path, name: &str) -> Result<(), BuildError> {
    tracing::info!(archive = name, "unpacking");
    let file = File::open(root.join(name)).map_err(|source| BuildError::Extraction {
        archive: name.to_string(),
        source,
    })?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.unpack(root).map_err(|source| BuildError::Extraction {
        archive: name.to_string(),
        source,
    })
}

fn run_make(
    root: &Path,
    target: &str,
    makefile: &str,
    token: &str,
    log_name: &str,
    runner: &dyn ProcessRunner,
) -> Result<(), BuildError> {
    let build_dir = root.join(target).join("build");
    let log = root.join(log_name);
    tracing::info!(target, token, log = %log.display(), "running native build");
    let code = runner.run(Path::new("make"), &["-f", makefile, token], &build_dir, Some(&log))?;
    if code != 0 {
        return Err(BuildError::CompileFailed {
            target: target.to_string(),
            code,
            log,
        });
    }
    Ok(())
}

/// Test fixture: a small gzipped tarball holding the given entries.
#[cfg(test)]
pub(crate) fn write_archive(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}
