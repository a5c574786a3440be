//! Process invocation seam.
//!
//! Compiler probes, native builds and solver runs all go through
//! [`ProcessRunner`], so the pipeline can be exercised end to end without a
//! Fortran toolchain on the machine.

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs one external program to completion and reports its exit code.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` inside `cwd`. When `log` is given, stdout
    /// and stderr both go to that file; otherwise they are discarded.
    fn run(&self, program: &Path, args: &[&str], cwd: &Path, log: Option<&Path>) -> io::Result<i32>;
}

/// The real thing, backed by `std::process::Command`.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str], cwd: &Path, log: Option<&Path>) -> io::Result<i32> {
        tracing::debug!(program = %program.display(), ?args, cwd = %cwd.display(), "spawning");
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd).stdin(Stdio::null());
        match log {
            Some(path) => {
                let out = File::create(path)?;
                let err = out.try_clone()?;
                cmd.stdout(Stdio::from(out)).stderr(Stdio::from(err));
            }
            None => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }
        let status = cmd.status()?;
        // A signal death has no code; report it as a plain failure.
        Ok(status.code().unwrap_or(-1))
    }
}

/// One recorded [`ProcessRunner::run`] call.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: std::path::PathBuf,
    pub args: Vec<String>,
    pub cwd: std::path::PathBuf,
    pub log: Option<std::path::PathBuf>,
}

#[cfg(test)]
impl RecordedCall {
    /// File name of the invoked program, lossy.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Test double: records every invocation and lets a handler fabricate the
/// side effects a real run would have.
#[cfg(test)]
pub struct ScriptedRunner {
    calls: std::sync::Mutex<Vec<RecordedCall>>,
    handler: Box<dyn Fn(&RecordedCall) -> io::Result<i32> + Send + Sync>,
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&RecordedCall) -> io::Result<i32> + Send + Sync + 'static,
    {
        ScriptedRunner {
            calls: std::sync::Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// A runner where every program exists and exits zero.
    pub fn ok() -> Self {
        ScriptedRunner::new(|_| Ok(0))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProcessRunner for ScriptedRunner {
    fn run(&self, program: &Path, args: &[&str], cwd: &Path, log: Option<&Path>) -> io::Result<i32> {
        let call = RecordedCall {
            program: program.to_path_buf(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
            log: log.map(|p| p.to_path_buf()),
        };
        let result = (self.handler)(&call);
        self.calls.lock().unwrap().push(call);
        result
    }
}
