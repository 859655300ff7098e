//! Working tree traversal and staging.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use loam_store::ObjectStore;
use loam_types::{ObjectKind, REPO_DIR};
use tracing::debug;
use walkdir::WalkDir;

use crate::entry::StagedEntry;
use crate::error::{IndexError, IndexResult};
use crate::index::Index;
use crate::stat::StatProvider;

/// Every regular file under `root`, in file-name order.
///
/// `root` itself is returned if it is a file. Directories named `skip` are
/// not descended into.
pub fn walk_files(root: &Path, skip: &str) -> IndexResult<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.depth() > 0 && e.file_name() == skip));
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// `path` relative to `worktree`, with `/` separators.
pub fn relative_path(worktree: &Path, path: &Path) -> IndexResult<String> {
    let rel = path.strip_prefix(worktree).map_err(|_| {
        IndexError::InvalidPath(format!(
            "{} is outside the worktree {}",
            path.display(),
            worktree.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                IndexError::InvalidPath(format!("{} is not valid UTF-8", path.display()))
            })?),
            Component::CurDir => {}
            _ => {
                return Err(IndexError::InvalidPath(format!(
                    "{} does not resolve inside the worktree",
                    path.display()
                )))
            }
        }
    }
    Ok(parts.join("/"))
}

/// Store every file under `paths` as a blob and record it in `index`.
///
/// Relative `paths` are taken relative to `worktree`. The repository
/// directory is never staged: a path inside it fails with
/// [`IndexError::InvalidPath`]. Returns the new entries in staging order; the
/// caller saves the index.
pub fn stage_paths(
    store: &dyn ObjectStore,
    index: &mut Index,
    stat: &dyn StatProvider,
    worktree: &Path,
    paths: &[PathBuf],
) -> IndexResult<Vec<StagedEntry>> {
    let mut staged = Vec::new();
    for path in paths {
        let path = if path.is_absolute() {
            path.clone()
        } else {
            worktree.join(path)
        };
        if !path.exists() {
            return Err(IndexError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("pathspec {} did not match any files", path.display()),
            )));
        }

        if in_repo_dir(&relative_path(worktree, &path)?) {
            return Err(IndexError::InvalidPath(format!(
                "{} is inside the repository directory",
                path.display()
            )));
        }

        for file in walk_files(&path, REPO_DIR)? {
            let rel = relative_path(worktree, &file)?;
            let content = fs::read(&file)?;
            let object_id = store.put(ObjectKind::Blob, &content)?;
            let meta = stat.stat(&file)?;

            let entry = StagedEntry::from_stat(rel, object_id, &meta);
            debug!(path = %entry.path, id = %object_id, size = entry.size, "staged");
            index.add_or_update(entry.clone())?;
            staged.push(entry);
        }
    }
    Ok(staged)
}

fn in_repo_dir(rel: &str) -> bool {
    rel.split('/').any(|part| part == REPO_DIR)
}
