//! Git repository cloning support.
//!
//! Remote references are cloned into a [`ScopedWorkspace`], a temporary
//! directory owned by a single run. The workspace is removed when it is
//! released or dropped, so every exit path of a run cleans up after itself.
//! Only available when the `git` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use repodoc::git::{CloneOptions, ScopedWorkspace};
//!
//! let workspace = ScopedWorkspace::new()?;
//! workspace.clone_repository("https://github.com/user/repo", &CloneOptions::default())?;
//! // workspace.path() points to the checked out repository
//! workspace.release();
//! ```

use crate::error::{DocgenError, Result};
use git2::{FetchOptions, RemoteCallbacks, build::RepoBuilder};
use log::{debug, info, warn};
use std::path::Path;
use tempfile::TempDir;

/// How a repository is fetched.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Branch to check out instead of the remote's default branch.
    pub branch: Option<String>,
    /// History depth; `None` fetches everything.
    pub depth: Option<i32>,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            branch: None,
            depth: Some(1),
        }
    }
}

/// A temporary directory exclusively owned by one run.
///
/// Dropping the workspace deletes the directory and its contents.
#[derive(Debug)]
pub struct ScopedWorkspace {
    temp_dir: TempDir,
}

impl ScopedWorkspace {
    /// Creates an empty workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("repodoc-")
            .tempdir()
            .map_err(|e| DocgenError::io(std::env::temp_dir(), e))?;
        debug!("Created workspace: {}", temp_dir.path().display());
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Clones `url` into the workspace root.
    ///
    /// # Errors
    ///
    /// Returns [`DocgenError::SourceUnavailable`] if the reference is
    /// malformed, the network is unreachable, or authentication fails.
    pub fn clone_repository(&self, url: &str, options: &CloneOptions) -> Result<()> {
        info!("Cloning repository: {}", url);

        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(|progress| {
            if progress.received_objects() == progress.total_objects() {
                debug!(
                    "Resolving deltas: {}/{}",
                    progress.indexed_deltas(),
                    progress.total_deltas()
                );
            } else {
                debug!(
                    "Receiving objects: {}/{} ({} bytes)",
                    progress.received_objects(),
                    progress.total_objects(),
                    progress.received_bytes()
                );
            }
            true
        });

        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);
        if let Some(depth) = options.depth {
            fetch_opts.depth(depth);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts);

        if let Some(branch_name) = options.branch.as_deref() {
            debug!("Checking out branch: {}", branch_name);
            builder.branch(branch_name);
        }

        builder
            .clone(url, self.path())
            .map_err(|e| DocgenError::SourceUnavailable {
                reference: url.to_string(),
                message: e.message().to_string(),
            })?;

        info!("Clone complete: {}", self.path().display());
        Ok(())
    }

    /// Deletes the workspace now, logging instead of failing if removal
    /// does not succeed.
    pub fn release(self) {
        let path = self.path().to_path_buf();
        match self.temp_dir.close() {
            Ok(()) => debug!("Removed workspace: {}", path.display()),
            Err(e) => warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }
}
