//! Harness configuration.
//!
//! Every field has a default so a YAML file only needs to name what it changes:
//!
//! ```yaml
//! input_dir: tests/graphs
//! run_reference: false
//! candidate:
//!   program: target/release/run
//!   args: []
//! viewer:
//!   preferred: inkview
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What happens to the rest of the run when a single render job fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Skip the failed job and continue with the next one.
    #[default]
    KeepGoing,
    /// Abort the run on the first failure, without dispatching a viewer.
    FailFast,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory scanned (non-recursively) for inputs.
    pub input_dir: PathBuf,
    /// Input file suffix, without the dot.
    pub extension: String,
    /// Raw `--filter` value; see [`crate::discovery::Filter::parse`].
    pub filter: Option<String>,
    pub fail_fast: bool,
    pub run_reference: bool,
    /// Marker word used by the reserved `only-<marker>` / `skip-<marker>` filter values.
    pub marker: String,
    /// Where outputs are written. `None` means the platform temp directory.
    pub temp_dir: Option<PathBuf>,
    pub output_extension: String,
    pub candidate: RendererConfig,
    pub reference: RendererConfig,
    pub viewer: ViewerConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("inputs"),
            extension: "dot".to_string(),
            filter: None,
            fail_fast: false,
            run_reference: true,
            marker: "html".to_string(),
            temp_dir: None,
            output_extension: "svg".to_string(),
            candidate: RendererConfig::candidate(),
            reference: RendererConfig::reference(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn from_yaml_str(path: &Path, text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| Error::ParseConfig {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(path, &text)
    }

    pub fn policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::KeepGoing
        }
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// An external renderer: `<program> <args...> <input> -o <output> [forwarded...]`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RendererConfig {
    pub program: String,
    /// Leading arguments placed before the input path.
    #[serde(default)]
    pub args: Vec<String>,
}

impl RendererConfig {
    /// The layout engine under test, built and run from this workspace's parent project.
    pub fn candidate() -> Self {
        Self {
            program: "cargo".to_string(),
            args: ["run", "--release", "--quiet", "--bin", "run", "--"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Graphviz `dot`.
    pub fn reference() -> Self {
        Self {
            program: "dot".to_string(),
            args: vec!["-Tsvg".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Viewer that accepts every output path in a single invocation.
    pub preferred: String,
    pub args: Vec<String>,
    /// Per-file opener used when `preferred` is not installed. `None` picks the platform
    /// default (`xdg-open`, `open` or `cmd /C start`).
    pub fallback: Option<RendererConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            preferred: "eog".to_string(),
            args: Vec::new(),
            fallback: None,
        }
    }
}
