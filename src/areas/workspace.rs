//! Working tree access
//!
//! Stats, reads, and lists files under the repository root. All paths
//! handed back to the core are repository-relative, `/`-separated strings.

use crate::artifacts::index::index_entry::EntryMetadata;
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".git", ".", ".."];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List tracked-candidate files under a path, repository-relative and
    /// sorted
    ///
    /// A file path lists just itself; a directory is walked recursively
    /// with `.git` ignored. No argument walks the whole root.
    pub fn list_files(&self, root: Option<&Path>) -> anyhow::Result<Vec<String>> {
        let root = match root {
            Some(path) => std::fs::canonicalize(path)
                .context(format!("The specified path does not exist: {path:?}"))?,
            None => self.path.to_path_buf(),
        };

        if root.is_dir() {
            let mut files: Vec<String> = WalkDir::new(&root)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| self.relativize(entry.path()))
                .collect();
            files.sort();
            Ok(files)
        } else {
            let relative = self
                .relativize(&root)
                .context(format!("Path {root:?} is outside the repository"))?;
            Ok(vec![relative])
        }
    }

    /// Repository-relative form of a user-supplied path; the root itself
    /// maps to `"."`
    ///
    /// Works for paths that no longer exist on disk, so a deleted file
    /// can still be named on the command line.
    pub fn relative_prefix(&self, path: &Path) -> anyhow::Result<String> {
        let absolute = match std::fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(_) if path.is_absolute() => path.to_path_buf(),
            Err(_) => std::env::current_dir()?.join(path),
        };

        Ok(self
            .relativize(&absolute)
            .unwrap_or_else(|| ".".to_string()))
    }

    fn relativize(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        if Self::is_ignored(relative) {
            return None;
        }

        let segments: Vec<&str> = relative
            .components()
            .filter_map(|component| match component {
                std::path::Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        }
    }

    fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                let name = name.to_string_lossy();
                IGNORED_PATHS.contains(&name.as_ref())
            } else {
                false
            }
        })
    }

    pub fn read_file(&self, relative_path: &str) -> anyhow::Result<Bytes> {
        let file_path = self.path.join(relative_path);

        let content = std::fs::read(&file_path)
            .context(format!("Unable to read file {}", file_path.display()))?;

        Ok(content.into())
    }

    pub fn stat_file(&self, relative_path: &str) -> anyhow::Result<EntryMetadata> {
        let file_path = self.path.join(relative_path);
        let metadata = std::fs::symlink_metadata(&file_path)
            .context(format!("Unable to stat file {}", file_path.display()))?;

        (file_path.as_path(), metadata).try_into()
    }

    pub fn file_exists(&self, relative_path: &str) -> bool {
        self.path.join(relative_path).exists()
    }
}
