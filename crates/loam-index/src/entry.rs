//! Index entry types for tracking working directory files.

use loam_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};
use crate::stat::FileStat;

/// An entry in the staging index, representing a tracked file.
///
/// Times are nanoseconds since the UNIX epoch. Integer fields are stored
/// bit-for-bit in the index file, so values that only fit the unsigned type
/// still round-trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEntry {
    /// Status change time.
    pub ctime: i64,
    /// Last modification time (used for quick dirty checks).
    pub mtime: i64,
    pub dev: u64,
    pub ino: u64,
    /// Mode bits as reported by the filesystem.
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// File size in bytes.
    pub size: u64,
    /// Blob holding the file's content.
    pub object_id: ObjectId,
    pub flags: u16,
    /// Path relative to the worktree root, `/`-separated.
    pub path: String,
}

impl StagedEntry {
    /// Build an entry for `path` from its metadata and stored blob.
    pub fn from_stat(path: impl Into<String>, object_id: ObjectId, stat: &FileStat) -> Self {
        Self {
            ctime: stat.ctime,
            mtime: stat.mtime,
            dev: stat.dev,
            ino: stat.ino,
            mode: stat.mode,
            uid: stat.uid,
            gid: stat.gid,
            size: stat.size,
            object_id,
            flags: stat.flags,
            path: path.into(),
        }
    }

    /// Whether the file described by `stat` looks changed since staging.
    pub fn is_stale(&self, stat: &FileStat) -> bool {
        self.size != stat.size || self.mtime != stat.mtime
    }
}

/// Return `entries` sorted by path.
///
/// The sort is stable, so entries sharing a path keep their relative order.
pub fn sort_entries(mut entries: Vec<StagedEntry>) -> Vec<StagedEntry> {
    entries.sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));
    entries
}

/// Reject paths the index file cannot represent.
pub fn validate_path(path: &str) -> IndexResult<()> {
    if path.is_empty() {
        return Err(IndexError::InvalidPath("empty path".to_string()));
    }
    if path.contains('\0') {
        return Err(IndexError::InvalidPath(format!(
            "path contains NUL: {path:?}"
        )));
    }
    Ok(())
}
