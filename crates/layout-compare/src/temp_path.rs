//! Output path allocation.

use crate::render::RendererKind;
use rustc_hash::{FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Hands out `out_<n>.<ext>` paths inside a single directory.
///
/// `n` is derived from a per-run nonce, the input path, the renderer and a sequence number
/// that only ever grows. Paths already handed out in this run, or already present on disk,
/// are skipped, so two jobs of one run never share an output file.
#[derive(Debug)]
pub struct OutputPathAllocator {
    dir: PathBuf,
    extension: String,
    nonce: u64,
    seq: u64,
    issued: FxHashSet<PathBuf>,
}

impl OutputPathAllocator {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let nonce = uuid::Uuid::new_v4().as_u128() as u64;
        Self::with_nonce(dir, extension, nonce)
    }

    /// Deterministic allocator, mostly useful in tests.
    pub fn with_nonce(dir: impl Into<PathBuf>, extension: impl Into<String>, nonce: u64) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            nonce,
            seq: 0,
            issued: FxHashSet::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    pub fn allocate(&mut self, input: &Path, renderer: RendererKind) -> PathBuf {
        loop {
            let path = self.dir.join(format!(
                "out_{}.{}",
                self.derive(input, renderer),
                self.extension
            ));
            self.seq += 1;
            if self.issued.contains(&path) || path.exists() {
                tracing::debug!(path = %path.display(), "output name taken, re-deriving");
                continue;
            }
            self.issued.insert(path.clone());
            return path;
        }
    }

    fn derive(&self, input: &Path, renderer: RendererKind) -> u64 {
        let mut h = FxHasher::default();
        self.nonce.hash(&mut h);
        input.hash(&mut h);
        renderer.hash(&mut h);
        self.seq.hash(&mut h);
        h.finish()
    }
}
