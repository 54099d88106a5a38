//! Run driver: discover → render (candidate, then reference) → collect → dispatch.

use crate::collect::RunResult;
use crate::config::{FailurePolicy, HarnessConfig};
use crate::discovery::{self, Filter, InputFile};
use crate::error::{Error, Result};
use crate::process::ProcessHost;
use crate::render::{RenderFailure, RenderJob, RendererKind};
use crate::temp_path::OutputPathAllocator;
use crate::viewer::{Dispatch, ViewerDispatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Discovering,
    ProcessingInputs,
    Collecting,
    Dispatching,
    Done,
    /// Fail-fast abort. Only reachable from `Discovering` and `ProcessingInputs`.
    Failed,
}

#[derive(Debug)]
pub struct RunReport {
    pub inputs: usize,
    pub jobs: usize,
    pub result: RunResult,
    /// Jobs skipped under [`FailurePolicy::KeepGoing`].
    pub skipped: Vec<RenderFailure>,
    pub dispatch: Dispatch,
}

pub struct Orchestrator<H> {
    config: HarnessConfig,
    host: H,
    forwarded: Vec<String>,
    view: bool,
    phase: Phase,
}

impl<H: ProcessHost> Orchestrator<H> {
    pub fn new(config: HarnessConfig, host: H) -> Self {
        Self {
            config,
            host,
            forwarded: Vec::new(),
            view: true,
            phase: Phase::Idle,
        }
    }

    /// Tuning flags appended to every candidate invocation.
    pub fn with_forwarded(mut self, forwarded: Vec<String>) -> Self {
        self.forwarded = forwarded;
        self
    }

    /// With `false`, the run stops after collecting and no viewer is launched.
    pub fn with_viewer(mut self, view: bool) -> Self {
        self.view = view;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    fn enter(&mut self, next: Phase) {
        tracing::debug!(from = ?self.phase, to = ?next, "phase");
        self.phase = next;
    }

    fn filter(&self) -> Option<Filter> {
        self.config
            .filter
            .as_deref()
            .and_then(|raw| Filter::parse(raw, &self.config.marker))
    }

    /// Lists the inputs a run would process.
    pub fn discover(&self) -> Result<Vec<InputFile>> {
        let filter = self.filter();
        discovery::discover(
            &self.config.input_dir,
            &self.config.extension,
            filter.as_ref(),
        )
    }

    pub fn run(&mut self) -> Result<RunReport> {
        self.enter(Phase::Discovering);
        let policy = self.config.policy();
        let inputs = match self.discover() {
            Ok(inputs) => inputs,
            Err(err) if policy == FailurePolicy::FailFast => {
                self.enter(Phase::Failed);
                return Err(err);
            }
            Err(err) => {
                tracing::warn!("{err}; continuing with no inputs");
                Vec::new()
            }
        };
        if inputs.is_empty() {
            tracing::info!(
                dir = %self.config.input_dir.display(),
                filter = self.config.filter.as_deref().unwrap_or(""),
                "no inputs matched"
            );
        }

        self.enter(Phase::ProcessingInputs);
        let mut allocator =
            OutputPathAllocator::new(self.config.temp_dir(), &self.config.output_extension);
        if !inputs.is_empty() {
            std::fs::create_dir_all(allocator.dir()).map_err(|source| {
                Error::CreateOutputDir {
                    path: allocator.dir().display().to_string(),
                    source,
                }
            })?;
        }

        let mut kinds = vec![RendererKind::Candidate];
        if self.config.run_reference {
            kinds.push(RendererKind::Reference);
        } else {
            tracing::debug!("reference renderer disabled");
        }

        let mut result = RunResult::new();
        let mut skipped: Vec<RenderFailure> = Vec::new();
        let mut jobs = 0;
        for input in &inputs {
            for &kind in &kinds {
                let output = allocator.allocate(input.path(), kind);
                let job = RenderJob::new(input.clone(), kind, output);
                let renderer = match kind {
                    RendererKind::Candidate => &self.config.candidate,
                    RendererKind::Reference => &self.config.reference,
                };
                jobs += 1;
                match job.execute(&mut self.host, renderer, &self.forwarded) {
                    Ok(path) => {
                        result.insert(path);
                    }
                    Err(failure) if policy == FailurePolicy::FailFast => {
                        tracing::error!("{failure}");
                        self.enter(Phase::Failed);
                        return Err(failure.into());
                    }
                    Err(failure) => {
                        tracing::warn!("skipping: {failure}");
                        skipped.push(failure);
                    }
                }
            }
        }

        self.enter(Phase::Collecting);
        tracing::info!(
            inputs = inputs.len(),
            jobs,
            produced = result.len(),
            skipped = skipped.len(),
            "render pass finished"
        );

        self.enter(Phase::Dispatching);
        let dispatch = if self.view {
            let viewer = ViewerDispatcher::new(self.config.viewer.clone());
            viewer.dispatch(&mut self.host, &result)?
        } else {
            Dispatch::Nothing
        };

        self.enter(Phase::Done);
        Ok(RunReport {
            inputs: inputs.len(),
            jobs,
            result,
            skipped,
            dispatch,
        })
    }
}
