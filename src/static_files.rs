//! Static file lookup.

use std::path::{Component, Path, PathBuf};

/// Maps a URL path to a file on disk.
pub trait StaticResolver: Send + Sync {
    fn resolve(&self, url_path: &str) -> Option<PathBuf>;
}

/// Resolves URL paths against a directory.
///
/// Directory requests map to the index file. Paths containing `..` or other
/// non-normal components never resolve, and only existing regular files
/// are returned.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
    index: String,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: "index.html".to_string(),
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StaticResolver for FsResolver {
    fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let path = url_path.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(path.trim_start_matches('/'));

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            tracing::debug!(url_path, "Rejected static path");
            return None;
        }

        let mut candidate = self.root.join(relative);
        if candidate.is_dir() {
            candidate.push(&self.index);
        }

        candidate.is_file().then_some(candidate)
    }
}
