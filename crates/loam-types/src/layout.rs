//! On-disk layout of a repository directory.

use std::path::{Path, PathBuf};

/// Name of the repository directory inside a worktree.
pub const REPO_DIR: &str = ".loam";

const OBJECTS_DIR: &str = "objects";
const INDEX_FILE: &str = "index";
const CONFIG_FILE: &str = "config.toml";

/// Paths of everything loam keeps under a repository root.
///
/// The root is the repository directory itself (`<worktree>/.loam`), not the
/// worktree. Store and index constructors take a layout rather than reading
/// global paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    /// Layout rooted at an existing or future repository directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout for the repository directory of a worktree.
    pub fn for_worktree(worktree: impl AsRef<Path>) -> Self {
        Self::new(worktree.as_ref().join(REPO_DIR))
    }

    /// Search `start` and its ancestors for a repository directory.
    pub fn discover(start: impl AsRef<Path>) -> Option<Self> {
        start
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(REPO_DIR))
            .find(|candidate| candidate.is_dir())
            .map(Self::new)
    }

    /// The repository directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The worktree containing the repository directory.
    pub fn worktree(&self) -> &Path {
        self.root.parent().unwrap_or(self.root.as_path())
    }

    /// `<root>/objects`
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join(OBJECTS_DIR)
    }

    /// `<root>/index`
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// `<root>/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}
