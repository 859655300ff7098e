//! The core Index structure managing staged entries in memory.
//!
//! [`IndexFile`] reads and writes the whole on-disk file; [`Index`] holds the
//! entries in a `BTreeMap` keyed by path so iteration is always in file order.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use loam_store::ObjectStore;
use loam_types::RepoLayout;
use tracing::{debug, info};

use crate::entry::{validate_path, StagedEntry};
use crate::error::{IndexError, IndexResult};
use crate::format::{decode_index, encode_index};

/// Location of an index file, with whole-file load and save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexFile {
    path: PathBuf,
}

impl IndexFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The index file of a repository.
    pub fn for_layout(layout: &RepoLayout) -> Self {
        Self::new(layout.index_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and verify every entry, in path order.
    ///
    /// A missing file is an empty index.
    pub fn load(&self) -> IndexResult<Vec<StagedEntry>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no index file, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let entries = decode_index(&data)?;
        debug!(path = %self.path.display(), entries = entries.len(), "index loaded");
        Ok(entries)
    }

    /// Sort, encode and replace the index file.
    ///
    /// The new contents are written to a temporary file in the same directory
    /// and renamed over the old file, so readers see either the old or the
    /// new index.
    pub fn save(&self, entries: &[StagedEntry]) -> IndexResult<()> {
        let bytes = encode_index(entries)?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(
            path = %self.path.display(),
            entries = entries.len(),
            bytes = bytes.len(),
            "index saved"
        );
        Ok(())
    }
}

/// The staging index: tracks which files are staged.
///
/// Entries are kept in memory and written back wholesale by [`Index::save`].
pub struct Index {
    file: IndexFile,
    entries: BTreeMap<String, StagedEntry>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("path", &self.file.path)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Index {
    /// An empty index that will be saved to `file`.
    pub fn new(file: IndexFile) -> Self {
        Self {
            file,
            entries: BTreeMap::new(),
        }
    }

    /// Load the index from `file`; a missing file gives an empty index.
    pub fn load(file: IndexFile) -> IndexResult<Self> {
        let entries = file
            .load()?
            .into_iter()
            .map(|e| (e.path.clone(), e))
            .collect();
        Ok(Self { file, entries })
    }

    /// Load the index of a repository.
    pub fn open(layout: &RepoLayout) -> IndexResult<Self> {
        Self::load(IndexFile::for_layout(layout))
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by path.
    pub fn get(&self, path: &str) -> Option<&StagedEntry> {
        self.entries.get(path)
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &StagedEntry> {
        self.entries.values()
    }

    /// Insert an entry, replacing any entry with the same path.
    ///
    /// Returns the replaced entry, if any.
    pub fn add_or_update(&mut self, entry: StagedEntry) -> IndexResult<Option<StagedEntry>> {
        validate_path(&entry.path)?;
        Ok(self.entries.insert(entry.path.clone(), entry))
    }

    /// Like [`Index::add_or_update`], but first checks that the entry's blob
    /// is present in `store`.
    pub fn stage_verified(
        &mut self,
        store: &dyn ObjectStore,
        entry: StagedEntry,
    ) -> IndexResult<Option<StagedEntry>> {
        if !store.contains(&entry.object_id)? {
            return Err(IndexError::ObjectNotFound(entry.object_id));
        }
        self.add_or_update(entry)
    }

    /// Remove an entry from the index entirely.
    pub fn remove(&mut self, path: &str) -> Option<StagedEntry> {
        self.entries.remove(path)
    }

    /// Write all entries back to the index file.
    pub fn save(&self) -> IndexResult<()> {
        let entries: Vec<StagedEntry> = self.entries.values().cloned().collect();
        self.file.save(&entries)
    }
}
