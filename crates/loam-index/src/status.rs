//! Working directory status.
//!
//! Compares index entries against the files currently on disk using the
//! cached size and modification time; content is not re-hashed.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::IndexResult;
use crate::index::Index;
use crate::stat::StatProvider;
use crate::workdir::relative_path;

/// Complete status of the working directory relative to the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdirStatus {
    /// Staged files that look unchanged on disk.
    pub unchanged: Vec<String>,
    /// Staged files whose size or mtime changed since staging.
    pub modified: Vec<String>,
    /// Staged files no longer present on disk.
    pub deleted: Vec<String>,
    /// Files on disk that are not in the index.
    pub untracked: Vec<String>,
}

impl WorkdirStatus {
    /// Create an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing differs from the index.
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty() && self.untracked.is_empty()
    }

    /// Total number of entries across all categories.
    pub fn total_entries(&self) -> usize {
        self.unchanged.len() + self.modified.len() + self.deleted.len() + self.untracked.len()
    }

    /// Flatten into one list ordered by path.
    pub fn entries(&self) -> Vec<StatusEntry> {
        let groups = [
            (&self.unchanged, FileStatus::Unchanged),
            (&self.modified, FileStatus::Modified),
            (&self.deleted, FileStatus::Deleted),
            (&self.untracked, FileStatus::Untracked),
        ];
        let mut entries: Vec<StatusEntry> = groups
            .into_iter()
            .flat_map(|(paths, status)| {
                paths
                    .iter()
                    .map(move |p| StatusEntry::new(p.clone(), status))
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

/// A single status entry representing a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The file path relative to the workdir root.
    pub path: String,
    pub status: FileStatus,
}

impl StatusEntry {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// How a file compares to its index entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Unchanged,
    Modified,
    Deleted,
    Untracked,
}

/// Classify every index entry and every file in `files`.
///
/// `files` are the paths found on disk (typically from
/// [`walk_files`](crate::workdir::walk_files)); any of them without an index
/// entry is untracked.
pub fn status(
    index: &Index,
    stat: &dyn StatProvider,
    worktree: &Path,
    files: &[PathBuf],
) -> IndexResult<WorkdirStatus> {
    let mut result = WorkdirStatus::new();

    for entry in index.iter() {
        match stat.stat(&worktree.join(&entry.path)) {
            Ok(current) if entry.is_stale(&current) => result.modified.push(entry.path.clone()),
            Ok(_) => result.unchanged.push(entry.path.clone()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                result.deleted.push(entry.path.clone())
            }
            Err(e) => return Err(e.into()),
        }
    }

    for file in files {
        let rel = relative_path(worktree, file)?;
        if index.get(&rel).is_none() {
            result.untracked.push(rel);
        }
    }
    result.untracked.sort();
    Ok(result)
}
