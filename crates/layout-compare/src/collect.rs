use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Outputs that were successfully produced during a run, in the order they completed.
#[derive(Debug, Default, Clone)]
pub struct RunResult {
    paths: Vec<PathBuf>,
    seen: FxHashSet<PathBuf>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished output. Returns `false` (and records nothing) if the path is
    /// already present.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if !self.seen.insert(path.clone()) {
            tracing::warn!(path = %path.display(), "output registered twice, ignoring");
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}
