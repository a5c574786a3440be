//! Isolated run directory provisioning.
//!
//! Each run directory gets private copies of the per-run template files
//! (the solver rewrites those during a run) and symlinks to the two shared
//! read-only artifacts, the line database and the solver executable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::common::{chmod_recursive, find_executable, remove_if_present, symlink};
use crate::tape3::DATABASE_NAME;

/// Per-run template files copied from the template directory.
pub const TEMPLATE_FILES: [&str; 4] = [
    "runlblrtm_v3.sh",
    "MIPAS_atmosphere_profile",
    "ParameterFile",
    "TAPE5",
];

/// Output directory created inside every run directory.
pub const OUTPUT_DIR_NAME: &str = "OutputModels";

/// Link name the run script invokes the solver through.
pub const SOLVER_LINK_NAME: &str = "lblrtm";

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no LBLRTM executable found in {0}")]
    SolverMissing(PathBuf),
    #[error("line database not found at {0}")]
    DatabaseMissing(PathBuf),
    #[error("failed to provision rundir{index}")]
    Rundir {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A provisioned run directory.
#[derive(Debug, Clone, Serialize)]
pub struct RunDirectory {
    pub index: usize,
    pub path: PathBuf,
    pub output_dir: PathBuf,
    pub database_link: PathBuf,
    pub solver_link: PathBuf,
}

/// Provision `count` run directories named `rundir1` .. `rundirN` under
/// `root`.
///
/// Re-running refreshes every directory in place: template copies are
/// overwritten and links dropped and recreated. On failure the directories
/// provisioned so far stay usable; the error names the index that failed.
pub fn provision(
    root: &Path,
    template_dir: &Path,
    count: usize,
    solver_dir: &Path,
    database: &Path,
) -> Result<Vec<RunDirectory>, ProvisionError> {
    let solver = find_solver(solver_dir)?;
    if !database.exists() {
        return Err(ProvisionError::DatabaseMissing(database.to_path_buf()));
    }
    let database = database.canonicalize().map_err(ProvisionError::Io)?;

    let mut provisioned = Vec::with_capacity(count);
    for index in 1..=count {
        let dir = root.join(format!("rundir{}", index));
        tracing::info!(path = %dir.display(), "provisioning run directory");
        let rundir = provision_one(index, &dir, template_dir, &solver, &database)
            .map_err(|source| ProvisionError::Rundir { index, source })?;
        provisioned.push(rundir);
    }
    Ok(provisioned)
}

fn provision_one(
    index: usize,
    dir: &Path,
    template_dir: &Path,
    solver: &Path,
    database: &Path,
) -> io::Result<RunDirectory> {
    let output_dir = dir.join(OUTPUT_DIR_NAME);
    fs::create_dir_all(&output_dir)?;

    // Private copies; the solver consumes these destructively per run.
    for name in TEMPLATE_FILES {
        fs::copy(template_dir.join(name), dir.join(name))?;
    }

    // Shared artifacts are linked, never copied. Stale links go first so a
    // re-run never layers link upon link.
    let database_link = dir.join(DATABASE_NAME);
    remove_if_present(&database_link)?;
    symlink(database, &database_link)?;

    let solver_link = dir.join(SOLVER_LINK_NAME);
    remove_if_present(&solver_link)?;
    symlink(solver, &solver_link)?;

    chmod_recursive(dir, 0o777)?;

    Ok(RunDirectory {
        index,
        path: dir.to_path_buf(),
        output_dir,
        database_link,
        solver_link,
    })
}

/// Locate the solver executable once, up front: the first plain file whose
/// name starts with `lblrtm`, resolved to an absolute path.
fn find_solver(dir: &Path) -> Result<PathBuf, ProvisionError> {
    if !dir.is_dir() {
        return Err(ProvisionError::SolverMissing(dir.to_path_buf()));
    }
    match find_executable(dir, |name| name.starts_with("lblrtm"))? {
        Some(path) => Ok(path.canonicalize().map_err(ProvisionError::Io)?),
        None => Err(ProvisionError::SolverMissing(dir.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SOLVER_NAME: &str = "lblrtm_v12.2_linux_gnu_sgl";

    /// Root with a built solver, a line database and the four templates.
    fn seed_root(root: &Path) {
        fs::create_dir_all(root.join("lblrtm")).unwrap();
        fs::write(root.join("lblrtm").join(SOLVER_NAME), "solver binary").unwrap();
        fs::create_dir_all(root.join("lnfl")).unwrap();
        fs::write(root.join("lnfl/TAPE3"), "line database").unwrap();
        fs::create_dir_all(root.join("data")).unwrap();
        for name in TEMPLATE_FILES {
            fs::write(root.join("data").join(name), format!("template {}", name)).unwrap();
        }
    }

    fn provision_four(root: &Path) -> Vec<RunDirectory> {
        provision(
            root,
            &root.join("data"),
            4,
            &root.join("lblrtm"),
            &root.join("lnfl/TAPE3"),
        )
        .unwrap()
    }

    #[test]
    fn test_provisions_copies_links_and_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);

        let rundirs = provision_four(root);
        assert_eq!(rundirs.len(), 4);
        for (i, rundir) in rundirs.iter().enumerate() {
            assert_eq!(rundir.index, i + 1);
            assert_eq!(rundir.path, root.join(format!("rundir{}", i + 1)));
            assert!(rundir.output_dir.is_dir());
            for name in TEMPLATE_FILES {
                let copy = rundir.path.join(name);
                assert!(copy.is_file());
                // Copies, not links.
                assert!(!fs::symlink_metadata(&copy).unwrap().file_type().is_symlink());
            }
            assert!(fs::symlink_metadata(&rundir.database_link)
                .unwrap()
                .file_type()
                .is_symlink());
            assert_eq!(
                fs::read_link(&rundir.solver_link).unwrap(),
                root.join("lblrtm").join(SOLVER_NAME).canonicalize().unwrap()
            );
        }
    }

    #[test]
    fn test_reprovisioning_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);

        provision_four(root);
        // Scribble over a copy and break a link, then provision again.
        fs::write(root.join("rundir2/ParameterFile"), "mutated").unwrap();
        remove_if_present(&root.join("rundir3/lblrtm")).unwrap();
        symlink(&root.join("nowhere"), &root.join("rundir3/lblrtm")).unwrap();

        let rundirs = provision_four(root);

        assert_eq!(rundirs.len(), 4);
        let rundir_entries = fs::read_dir(root)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("rundir"))
            .count();
        assert_eq!(rundir_entries, 4);
        // The copy is restored and the dangling link repointed.
        assert_eq!(
            fs::read_to_string(root.join("rundir2/ParameterFile")).unwrap(),
            "template ParameterFile"
        );
        assert_eq!(
            fs::read_link(root.join("rundir3/lblrtm")).unwrap(),
            root.join("lblrtm").join(SOLVER_NAME).canonicalize().unwrap()
        );
    }

    #[test]
    fn test_rundirs_are_isolated() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);
        provision_four(root);

        fs::write(root.join("rundir1/TAPE5"), "mutated by run 1").unwrap();
        assert_eq!(
            fs::read_to_string(root.join("rundir2/TAPE5")).unwrap(),
            "template TAPE5"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_rundirs_are_world_writable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);
        let rundirs = provision_four(root);

        for rundir in &rundirs {
            for path in [&rundir.path, &rundir.output_dir, &rundir.path.join("TAPE5")] {
                let mode = fs::metadata(path).unwrap().permissions().mode();
                assert_eq!(mode & 0o777, 0o777, "wrong mode on {}", path.display());
            }
        }
    }

    #[test]
    fn test_missing_solver_and_database() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);

        fs::remove_file(root.join("lblrtm").join(SOLVER_NAME)).unwrap();
        let err = provision(
            root,
            &root.join("data"),
            4,
            &root.join("lblrtm"),
            &root.join("lnfl/TAPE3"),
        )
        .unwrap_err();
        assert!(matches!(err, ProvisionError::SolverMissing(_)));

        fs::write(root.join("lblrtm").join(SOLVER_NAME), "solver binary").unwrap();
        fs::remove_file(root.join("lnfl/TAPE3")).unwrap();
        let err = provision(
            root,
            &root.join("data"),
            4,
            &root.join("lblrtm"),
            &root.join("lnfl/TAPE3"),
        )
        .unwrap_err();
        assert!(matches!(err, ProvisionError::DatabaseMissing(_)));
        // Nothing was provisioned either time.
        assert!(!root.join("rundir1").exists());
    }

    #[test]
    fn test_failure_keeps_earlier_rundirs_and_names_the_index() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);
        // A plain file where rundir2 should go makes index 2 fail.
        fs::write(root.join("rundir2"), "in the way").unwrap();

        let err = provision(
            root,
            &root.join("data"),
            3,
            &root.join("lblrtm"),
            &root.join("lnfl/TAPE3"),
        )
        .unwrap_err();

        match err {
            ProvisionError::Rundir { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(root.join("rundir1/OutputModels").is_dir());
        assert!(!root.join("rundir3").exists());
    }

    #[test]
    fn test_concurrent_runs_write_disjoint_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);
        let rundirs = provision_four(root);

        let handles: Vec<_> = rundirs
            .into_iter()
            .map(|rundir| {
                thread::spawn(move || {
                    // A run rewrites its private inputs and drops results in
                    // its own output directory.
                    fs::write(
                        rundir.path.join("TAPE5"),
                        format!("run {} control", rundir.index),
                    )
                    .unwrap();
                    fs::write(
                        rundir.output_dir.join("model_output"),
                        format!("model from rundir{}", rundir.index),
                    )
                    .unwrap();
                    fs::read_to_string(&rundir.database_link).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "line database");
        }

        for i in 1..=4 {
            assert_eq!(
                fs::read_to_string(root.join(format!("rundir{}/TAPE5", i))).unwrap(),
                format!("run {} control", i)
            );
            assert_eq!(
                fs::read_to_string(root.join(format!("rundir{}/OutputModels/model_output", i)))
                    .unwrap(),
                format!("model from rundir{}", i)
            );
        }
        // The shared database saw none of it.
        assert_eq!(
            fs::read_to_string(root.join("lnfl/TAPE3")).unwrap(),
            "line database"
        );
    }
}
