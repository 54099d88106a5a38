//! Viewer dispatch: one preferred viewer for everything, or the platform opener per file.

use crate::collect::RunResult;
use crate::config::{RendererConfig, ViewerConfig};
use crate::error::{Error, Result};
use crate::process::{Invocation, ProcessHost};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to show.
    Nothing,
    /// The preferred viewer was launched once with every output.
    Preferred { program: String, count: usize },
    /// The preferred viewer is not installed; each output was opened on its own.
    Fallback {
        program: String,
        opened: usize,
        failed: usize,
    },
}

#[derive(Debug, Clone)]
pub struct ViewerDispatcher {
    config: ViewerConfig,
}

impl ViewerDispatcher {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    fn fallback(&self) -> RendererConfig {
        self.config.fallback.clone().unwrap_or_else(platform_opener)
    }

    /// Launches viewers for `result` without waiting on them.
    pub fn dispatch<H: ProcessHost + ?Sized>(
        &self,
        host: &mut H,
        result: &RunResult,
    ) -> Result<Dispatch> {
        if result.is_empty() {
            tracing::info!("no outputs to show");
            return Ok(Dispatch::Nothing);
        }

        let preferred = self.config.preferred.as_str();
        if host.is_available(preferred) {
            let inv = Invocation::new(preferred)
                .args(self.config.args.iter())
                .args(result.iter());
            tracing::info!(viewer = preferred, count = result.len(), "opening outputs");
            host.launch(&inv).map_err(|source| Error::ViewerLaunch {
                program: preferred.to_string(),
                source,
            })?;
            return Ok(Dispatch::Preferred {
                program: preferred.to_string(),
                count: result.len(),
            });
        }

        let opener = self.fallback();
        tracing::debug!(
            viewer = preferred,
            fallback = opener.program.as_str(),
            "preferred viewer not found, opening outputs one by one"
        );
        let mut opened = 0;
        let mut failed = 0;
        for path in result.iter() {
            let inv = Invocation::new(opener.program.clone())
                .args(opener.args.iter())
                .arg(path);
            match host.launch(&inv) {
                Ok(()) => opened += 1,
                Err(err) => {
                    failed += 1;
                    tracing::warn!("failed to open {}: {err}", path.display());
                }
            }
        }
        if opened == 0 {
            return Err(Error::FallbackExhausted {
                program: opener.program,
                count: failed,
            });
        }
        Ok(Dispatch::Fallback {
            program: opener.program,
            opened,
            failed,
        })
    }
}

/// The platform's "open with the default application" command.
pub fn platform_opener() -> RendererConfig {
    if cfg!(windows) {
        // `start` treats the first quoted argument as a window title.
        RendererConfig {
            program: "cmd".to_string(),
            args: vec!["/C".to_string(), "start".to_string(), String::new()],
        }
    } else if cfg!(target_os = "macos") {
        RendererConfig {
            program: "open".to_string(),
            args: Vec::new(),
        }
    } else {
        RendererConfig {
            program: "xdg-open".to_string(),
            args: Vec::new(),
        }
    }
}
