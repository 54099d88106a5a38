//! Renderer invocation.

use crate::config::RendererConfig;
use crate::discovery::InputFile;
use crate::process::{Invocation, ProcessHost};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// The layout engine under test. Receives the forwarded tuning flags.
    Candidate,
    /// The trusted baseline. Never receives tuning flags.
    Reference,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Candidate => "candidate",
            Self::Reference => "reference",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FailureReason {
    #[error("could not start: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("exited with code {0}")]
    Exit(i32),
    #[error("terminated by signal")]
    Signal,
    #[error("reported success but left no output")]
    MissingOutput,
}

#[derive(Debug, thiserror::Error)]
#[error("{kind} renderer failed on {} ({reason}): `{command}`", .input.display())]
pub struct RenderFailure {
    pub kind: RendererKind,
    pub input: PathBuf,
    pub output: PathBuf,
    pub command: String,
    #[source]
    pub reason: FailureReason,
}

/// One renderer applied to one input, writing to its own output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub input: InputFile,
    pub kind: RendererKind,
    pub output: PathBuf,
}

impl RenderJob {
    pub fn new(input: InputFile, kind: RendererKind, output: PathBuf) -> Self {
        Self {
            input,
            kind,
            output,
        }
    }

    /// `<program> <args...> <input> -o <output>`, plus `forwarded` for the candidate only.
    pub fn invocation(&self, renderer: &RendererConfig, forwarded: &[String]) -> Invocation {
        let inv = Invocation::new(renderer.program.clone())
            .args(renderer.args.iter())
            .arg(self.input.path())
            .arg("-o")
            .arg(&self.output);
        match self.kind {
            RendererKind::Candidate => inv.args(forwarded.iter()),
            RendererKind::Reference => inv,
        }
    }

    /// Runs the job to completion. On success the output path is returned and is known to
    /// hold a non-empty file; partial output of a failed run is left where it is.
    pub fn execute<H: ProcessHost + ?Sized>(
        self,
        host: &mut H,
        renderer: &RendererConfig,
        forwarded: &[String],
    ) -> Result<PathBuf, RenderFailure> {
        let inv = self.invocation(renderer, forwarded);
        tracing::info!(
            renderer = %self.kind,
            input = self.input.file_name(),
            output = %self.output.display(),
            "rendering"
        );
        tracing::debug!("{inv}");

        let reason = match host.run(&inv) {
            Err(err) => Some(FailureReason::Spawn(err)),
            Ok(status) if status.success() => {
                (!is_nonempty_file(&self.output)).then_some(FailureReason::MissingOutput)
            }
            Ok(status) => Some(match status.code {
                Some(code) => FailureReason::Exit(code),
                None => FailureReason::Signal,
            }),
        };

        match reason {
            None => Ok(self.output),
            Some(reason) => Err(RenderFailure {
                kind: self.kind,
                input: self.input.path().to_path_buf(),
                output: self.output,
                command: inv.to_string(),
                reason,
            }),
        }
    }
}

fn is_nonempty_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}
