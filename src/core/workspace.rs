//! Per-request temporary directories

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::FetchError;
use crate::utils::has_extension;

/// Prefix given to every workspace directory
const WORKSPACE_PREFIX: &str = "tubefetch-";

/// Allocates isolated workspaces under a root directory
#[derive(Debug, Clone, Default)]
pub struct WorkspaceManager {
    root: Option<PathBuf>,
}

impl WorkspaceManager {
    /// Create a manager that allocates under the system temp directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate under `root` instead of the system temp directory
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Root directory workspaces are created in
    pub fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Create a new, empty, uniquely named workspace
    pub fn allocate(&self) -> Result<Workspace, FetchError> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(self.root())?;
        debug!("Allocated workspace {}", dir.path().display());
        Ok(Workspace { dir })
    }
}

/// An exclusively owned directory for one download.
///
/// The directory and everything in it is removed when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Directory path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Files directly inside the workspace whose name ends with `extension`,
    /// sorted by name
    pub fn files_with_extension(&self, extension: &str) -> Vec<PathBuf> {
        WalkDir::new(self.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable workspace entry: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| has_extension(name, extension))
                    .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect()
    }
}
