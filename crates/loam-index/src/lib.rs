//! Staging index for loam.
//!
//! The index file records the metadata and blob id of every staged file. It
//! is a big-endian binary file: a `DIRC` header, one fixed block plus padded
//! path per entry (sorted by path), and a trailing SHA-1 over everything
//! before it. A corrupt index fails to load; it is never repaired.
//!
//! # Key Types
//!
//! - [`Index`] -- The in-memory staging area (BTreeMap-backed)
//! - [`IndexFile`] -- Whole-file load and save of the on-disk index
//! - [`StagedEntry`] -- A tracked file entry
//! - [`StatProvider`] -- Source of file metadata ([`SystemStat`] in production)
//! - [`WorkdirStatus`] -- Result of comparing the index to the working tree

pub mod entry;
pub mod error;
pub mod format;
pub mod index;
pub mod stat;
pub mod status;
pub mod workdir;

pub use entry::{sort_entries, StagedEntry};
pub use error::{IndexError, IndexResult};
pub use format::{decode_index, encode_index, INDEX_SIGNATURE, INDEX_VERSION};
pub use index::{Index, IndexFile};
pub use stat::{FileStat, StatProvider, SystemStat};
pub use status::{status, FileStatus, StatusEntry, WorkdirStatus};
pub use workdir::{relative_path, stage_paths, walk_files};
