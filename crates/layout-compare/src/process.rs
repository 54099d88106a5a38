//! External process plumbing.
//!
//! Everything the harness starts goes through a [`ProcessHost`], so the orchestration logic
//! can be exercised without real renderers or viewers installed.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status of a finished child. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait ProcessHost {
    /// Runs the command to completion, inheriting stdio.
    fn run(&mut self, invocation: &Invocation) -> std::io::Result<RunStatus>;

    /// Starts the command and returns immediately; the child is never waited on.
    fn launch(&mut self, invocation: &Invocation) -> std::io::Result<()>;

    /// Whether `program` can be started on this host.
    fn is_available(&self, program: &str) -> bool;
}

/// The real host, backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl ProcessHost for SystemHost {
    fn run(&mut self, invocation: &Invocation) -> std::io::Result<RunStatus> {
        let status = invocation.to_command().status()?;
        Ok(RunStatus {
            code: status.code(),
        })
    }

    fn launch(&mut self, invocation: &Invocation) -> std::io::Result<()> {
        let child = invocation
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tracing::debug!(pid = child.id(), "launched {invocation}");
        Ok(())
    }

    fn is_available(&self, program: &str) -> bool {
        find_program(program).is_some()
    }
}

/// Resolves `program` the way a shell would: a name containing a path separator is checked
/// directly, anything else is looked up on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return as_path.is_file().then(|| as_path.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    find_program_in(program, std::env::split_paths(&path_var))
}

pub(crate) fn find_program_in(
    program: &str,
    dirs: impl IntoIterator<Item = PathBuf>,
) -> Option<PathBuf> {
    for dir in dirs {
        for name in candidate_names(program) {
            let p = dir.join(&name);
            if p.is_file() {
                return Some(p);
            }
        }
    }
    None
}

#[cfg(windows)]
fn candidate_names(program: &str) -> Vec<String> {
    if Path::new(program).extension().is_some() {
        return vec![program.to_string()];
    }
    let exts = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    std::iter::once(program.to_string())
        .chain(
            exts.split(';')
                .filter(|e| !e.is_empty())
                .map(|e| format!("{program}{e}")),
        )
        .collect()
}

#[cfg(not(windows))]
fn candidate_names(program: &str) -> Vec<String> {
    vec![program.to_string()]
}
