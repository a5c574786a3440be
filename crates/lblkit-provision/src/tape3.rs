//! Line database generation.
//!
//! LNFL turns the master line list (TAPE1) into the binary line database
//! (TAPE3) the solver reads, driven by a fixed-format TAPE5 control file.
//! The database only depends on the wavelength window, so an existing
//! TAPE3 is reused as is.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use lblkit_core::spectral::SpectralRange;

use crate::artifacts::LNFL_DIR;
use crate::common::{find_executable, remove_if_present, symlink};
use crate::process::ProcessRunner;

/// The generated line database.
pub const DATABASE_NAME: &str = "TAPE3";

/// Link name LNFL reads the master line list through.
pub const LINE_LIST_NAME: &str = "TAPE1";

/// The LNFL control file.
pub const CONTROL_FILE_NAME: &str = "TAPE5";

/// Relative path of the master line list inside the unpacked data archive.
pub const MASTER_LINE_LIST: &str = "aer_v_3.2/line_file/aer_v_3.2";

/// LNFL run log, written into the install root.
pub const RUN_LOG: &str = "lnfl_run.log";

/// Tapes from a previous run that would confuse LNFL.
const STALE_TAPES: [&str; 5] = ["TAPE1", "TAPE2", "TAPE5", "TAPE6", "TAPE10"];

/// Molecular species selection: one flag per species, all enabled.
const SPECIES_FLAGS: &str = "11111111111111111111111111111111111111111111";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("master line list not found at {0}")]
    LineListMissing(PathBuf),
    #[error("no LNFL executable found in {0}")]
    ExecutableMissing(PathBuf),
    #[error("LNFL failed with exit code {code}, see {log}")]
    ExecutionFailed { code: i32, log: PathBuf },
    #[error("LNFL exited cleanly but produced no TAPE3, see {log}")]
    DatabaseNotProduced { log: PathBuf },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A generated (or reused) line database.
#[derive(Debug, Clone)]
pub struct LineDatabase {
    pub path: PathBuf,
    /// False when an existing TAPE3 was reused.
    pub freshly_built: bool,
}

/// The TAPE5 control file: an ID record, the wavenumber window and the
/// species flag line, without a trailing newline.
pub fn control_file_contents(range: &SpectralRange) -> String {
    format!(
        "$ TAPE5 file for LNFL, generated by lblkit\n{}\n{}",
        range.bounds_record(),
        SPECIES_FLAGS
    )
}

/// Generate the line database for `range`, reusing an existing one.
pub fn generate(
    root: &Path,
    range: &SpectralRange,
    runner: &dyn ProcessRunner,
) -> Result<LineDatabase, GenerationError> {
    let lnfl_dir = root.join(LNFL_DIR);
    let database = lnfl_dir.join(DATABASE_NAME);
    if database.exists() {
        tracing::info!(path = %database.display(), "line database already present, skipping generation");
        return Ok(LineDatabase {
            path: database,
            freshly_built: false,
        });
    }
    if !lnfl_dir.is_dir() {
        return Err(GenerationError::ExecutableMissing(lnfl_dir));
    }

    for name in STALE_TAPES {
        remove_if_present(&lnfl_dir.join(name))?;
    }

    fs::write(lnfl_dir.join(CONTROL_FILE_NAME), control_file_contents(range))?;

    let master = root.join(MASTER_LINE_LIST);
    if !master.exists() {
        return Err(GenerationError::LineListMissing(master));
    }
    // Absolute target, so the link keeps working wherever LNFL is run from.
    let master = master.canonicalize()?;
    symlink(&master, &lnfl_dir.join(LINE_LIST_NAME))?;

    let executable = match find_executable(&lnfl_dir, |name| name.contains("lnfl"))? {
        Some(path) => path.canonicalize()?,
        None => return Err(GenerationError::ExecutableMissing(lnfl_dir)),
    };

    let log = root.join(RUN_LOG);
    tracing::info!(executable = %executable.display(), log = %log.display(), "running LNFL");
    let code = runner.run(&executable, &[], &lnfl_dir, Some(&log))?;
    if code != 0 {
        return Err(GenerationError::ExecutionFailed { code, log });
    }
    if !database.exists() {
        return Err(GenerationError::DatabaseNotProduced { log });
    }

    tracing::info!(path = %database.display(), "line database generated");
    Ok(LineDatabase {
        path: database,
        freshly_built: true,
    })
}
