//! Input discovery and name filtering.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct InputFile {
    path: PathBuf,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMode {
    /// Keep only names containing the marker.
    Only,
    /// Drop names containing the marker.
    Skip,
}

/// Case-insensitive predicate over input file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Substring(String),
    Marker { word: String, mode: MarkerMode },
}

impl Filter {
    /// Interprets a raw `--filter` value. `only-<marker>` and `skip-<marker>` are reserved;
    /// anything else is a plain substring. Blank values mean "no filter".
    pub fn parse(raw: &str, marker: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let lowered = raw.to_lowercase();
        let marker = marker.trim().to_lowercase();
        if !marker.is_empty() {
            if lowered.strip_prefix("only-") == Some(marker.as_str()) {
                return Some(Self::Marker {
                    word: marker,
                    mode: MarkerMode::Only,
                });
            }
            if lowered.strip_prefix("skip-") == Some(marker.as_str()) {
                return Some(Self::Marker {
                    word: marker,
                    mode: MarkerMode::Skip,
                });
            }
        }
        Some(Self::Substring(lowered))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        match self {
            Self::Substring(s) => name.contains(s.as_str()),
            Self::Marker {
                word,
                mode: MarkerMode::Only,
            } => name.contains(word.as_str()),
            Self::Marker {
                word,
                mode: MarkerMode::Skip,
            } => !name.contains(word.as_str()),
        }
    }
}

/// Lists `dir` (non-recursively) for files ending in `.<extension>` that pass `filter`.
///
/// The result is sorted by path so repeated runs present outputs in the same order.
pub fn discover(dir: &Path, extension: &str, filter: Option<&Filter>) -> Result<Vec<InputFile>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::ReadInputDir {
        path: dir.display().to_string(),
        source,
    })?;

    let mut inputs: Vec<InputFile> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path
            .extension()
            .and_then(|e| e.to_str())
            .is_none_or(|e| !e.eq_ignore_ascii_case(extension))
        {
            continue;
        }
        let input = InputFile::new(path);
        if let Some(f) = filter {
            if !f.matches(input.file_name()) {
                tracing::debug!(input = input.file_name(), "filtered out");
                continue;
            }
        }
        inputs.push(input);
    }
    inputs.sort();
    Ok(inputs)
}
