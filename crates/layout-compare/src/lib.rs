#![forbid(unsafe_code)]

//! Visual comparison harness for a graph layout engine (headless driver).
//!
//! Design goals:
//! - render every `.dot` input through the candidate engine and a trusted reference renderer
//! - isolated, collision-free output paths per job
//! - hand the produced images to a viewer for side-by-side review, never block on it
//!
//! Layout quality is judged by a human; this crate only drives the external tools.

pub mod collect;
pub mod config;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod render;
pub mod telemetry;
pub mod temp_path;
pub mod viewer;

pub use collect::RunResult;
pub use config::{FailurePolicy, HarnessConfig, RendererConfig, ViewerConfig};
pub use discovery::{Filter, InputFile, MarkerMode};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, Phase, RunReport};
pub use process::{Invocation, ProcessHost, RunStatus, SystemHost};
pub use render::{FailureReason, RenderFailure, RenderJob, RendererKind};
pub use temp_path::OutputPathAllocator;
pub use viewer::{Dispatch, ViewerDispatcher};
