//! The composed provisioning pipeline.

use std::io;

use thiserror::Error;

use lblkit_core::config::SetupConfig;

use crate::artifacts::{self, BuildError, SolverArtifacts};
use crate::compiler::{self, CompilerProfile, ResolutionError};
use crate::environment::{self, EnvironmentRecord};
use crate::process::ProcessRunner;
use crate::rundir::{self, ProvisionError, RunDirectory};
use crate::tape3::{self, GenerationError, LineDatabase};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Everything a completed setup produced.
#[derive(Debug)]
pub struct SetupReport {
    pub profile: CompilerProfile,
    pub artifacts: SolverArtifacts,
    pub database: LineDatabase,
    pub rundirs: Vec<RunDirectory>,
    pub environment: EnvironmentRecord,
}

/// A finished pipeline stage, borrowing that stage's output.
#[derive(Debug)]
pub enum StageOutcome<'a> {
    CompilerResolved(&'a CompilerProfile),
    SolversBuilt(&'a SolverArtifacts),
    DatabaseReady(&'a LineDatabase),
    RundirsProvisioned(&'a [RunDirectory]),
    EnvironmentAdvertised(&'a EnvironmentRecord),
}

impl StageOutcome<'_> {
    /// Stage name as it appears in logs and the audit trail.
    pub fn name(&self) -> &'static str {
        match self {
            StageOutcome::CompilerResolved(_) => "compiler",
            StageOutcome::SolversBuilt(_) => "build",
            StageOutcome::DatabaseReady(_) => "tape3",
            StageOutcome::RundirsProvisioned(_) => "rundirs",
            StageOutcome::EnvironmentAdvertised(_) => "environment",
        }
    }
}

/// Run the whole pipeline against `cfg.root`: resolve a compiler, build
/// the solvers, generate the line database, provision the run directories
/// and advertise the install root. `on_stage` fires once after each stage
/// finishes, so callers report progress without re-driving the stages
/// themselves.
///
/// Stages are individually idempotent, so rerunning after a failure picks
/// up where the previous attempt left off.
pub fn run_setup(
    cfg: &SetupConfig,
    runner: &dyn ProcessRunner,
    mut on_stage: impl FnMut(StageOutcome<'_>),
) -> Result<SetupReport, SetupError> {
    let profile = compiler::resolve_host(runner)?;
    on_stage(StageOutcome::CompilerResolved(&profile));
    let artifacts = artifacts::build(&cfg.root, &profile, runner)?;
    on_stage(StageOutcome::SolversBuilt(&artifacts));
    let database = tape3::generate(&cfg.root, &cfg.range, runner)?;
    on_stage(StageOutcome::DatabaseReady(&database));
    let rundirs = rundir::provision(
        &cfg.root,
        &cfg.templates(),
        cfg.rundir_count,
        &artifacts.lblrtm_dir,
        &database.path,
    )?;
    on_stage(StageOutcome::RundirsProvisioned(&rundirs));
    let environment = environment::advertise(&cfg.root, cfg.profile.as_deref(), cfg.apply_env)?;
    on_stage(StageOutcome::EnvironmentAdvertised(&environment));
    Ok(SetupReport {
        profile,
        artifacts,
        database,
        rundirs,
        environment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::write_archive;
    use crate::process::{RecordedCall, ScriptedRunner};
    use crate::rundir::TEMPLATE_FILES;
    use lblkit_core::spectral::SpectralRange;
    use std::fs;
    use std::path::Path;

    fn test_config(root: &Path) -> SetupConfig {
        SetupConfig {
            root: root.to_path_buf(),
            range: SpectralRange::default(),
            rundir_count: 4,
            template_dir: None,
            profile: None,
            apply_env: false,
        }
    }

    fn seed_root(root: &Path) {
        write_archive(
            &root.join("aer_v_3.2.tar.gz"),
            &[("aer_v_3.2/line_file/aer_v_3.2", "line data")],
        );
        write_archive(
            &root.join("aerlnfl_v2.6.tar.gz"),
            &[("lnfl/build/make_lnfl", "lnfl makefile")],
        );
        write_archive(
            &root.join("aerlbl_v12.2.tar.gz"),
            &[("lblrtm/build/make_lblrtm", "lblrtm makefile")],
        );
        fs::create_dir_all(root.join("data")).unwrap();
        for name in TEMPLATE_FILES {
            fs::write(root.join("data").join(name), format!("template {}", name)).unwrap();
        }
    }

    /// Stands in for the whole toolchain: gfortran answers the probe, make
    /// drops an executable next to the build tree it ran in, LNFL writes a
    /// TAPE3 into its working directory.
    fn toolchain() -> ScriptedRunner {
        ScriptedRunner::new(|call: &RecordedCall| {
            let name = call.program_name();
            if name == "make" {
                let target_dir = call.cwd.parent().unwrap();
                let executable = if call.args.contains(&"make_lnfl".to_string()) {
                    "lnfl_v2.6_linux_gnu_sgl"
                } else {
                    "lblrtm_v12.2_linux_gnu_sgl"
                };
                fs::write(target_dir.join(executable), "executable").unwrap();
                Ok(0)
            } else if name.starts_with("lnfl") {
                fs::write(call.cwd.join("TAPE3"), "line database").unwrap();
                Ok(0)
            } else if name == "gfortran" {
                Ok(0)
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such program",
                ))
            }
        })
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);

        let runner = toolchain();
        let report = run_setup(&test_config(root), &runner, |_| {}).unwrap();

        assert!(report.profile.token().ends_with("GNUsgl"));
        assert!(report.database.freshly_built);
        assert_eq!(report.database.path, root.join("lnfl/TAPE3"));
        assert_eq!(report.rundirs.len(), 4);
        for rundir in &report.rundirs {
            assert!(rundir.output_dir.is_dir());
            assert_eq!(
                fs::read_to_string(rundir.path.join("TAPE3")).unwrap(),
                "line database"
            );
            assert!(rundir.path.join("runlblrtm_v3.sh").is_file());
        }
        assert!(report.environment.value.ends_with('/'));

        // Two probes, two makes, one LNFL run, in that order.
        let names: Vec<String> = runner.calls().iter().map(|c| c.program_name()).collect();
        assert_eq!(names.len(), 5);
        assert_eq!(names[0], "ifort");
        assert_eq!(names[1], "gfortran");
        assert_eq!(names[2], "make");
        assert_eq!(names[3], "make");
        assert!(names[4].starts_with("lnfl"));
    }

    #[test]
    fn test_rerunning_setup_reuses_the_database() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);

        run_setup(&test_config(root), &toolchain(), |_| {}).unwrap();
        let second = toolchain();
        let report = run_setup(&test_config(root), &second, |_| {}).unwrap();

        assert!(!report.database.freshly_built);
        assert!(second
            .calls()
            .iter()
            .all(|call| !call.program_name().starts_with("lnfl")));
        assert_eq!(report.rundirs.len(), 4);
    }

    #[test]
    fn test_missing_archive_stops_the_pipeline() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);
        fs::remove_file(root.join("aerlnfl_v2.6.tar.gz")).unwrap();

        let mut stages = Vec::new();
        let err = run_setup(&test_config(root), &toolchain(), |outcome| {
            stages.push(outcome.name())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SetupError::Build(BuildError::MissingArchive(_))
        ));
        assert!(!root.join("rundir1").exists());
        // Only the stage that actually finished was observed.
        assert_eq!(stages, ["compiler"]);
    }

    #[test]
    fn test_observer_fires_once_per_stage_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        seed_root(root);

        let mut stages = Vec::new();
        let mut database_reused = None;
        let report = run_setup(&test_config(root), &toolchain(), |outcome| {
            if let StageOutcome::DatabaseReady(database) = &outcome {
                database_reused = Some(!database.freshly_built);
            }
            stages.push(outcome.name());
        })
        .unwrap();

        assert_eq!(
            stages,
            ["compiler", "build", "tape3", "rundirs", "environment"]
        );
        assert_eq!(database_reused, Some(false));
        assert_eq!(report.rundirs.len(), 4);
    }
}
