//! Resolves the user's input to a directory on disk.

use crate::error::{DocgenError, Result};
#[cfg(feature = "git")]
use crate::git::{CloneOptions, ScopedWorkspace};
use log::{debug, error};
use reqwest::Url;
use std::path::{Path, PathBuf};

/// Host whose repository URLs are cloned instead of read from disk.
pub const REMOTE_HOST: &str = "github.com";

/// Returns true if `input` is a `https://github.com/<owner>/<repo>` style URL.
pub fn is_remote_reference(input: &str) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };

    if url.host_str() != Some(REMOTE_HOST) || url.port().is_some() {
        return false;
    }

    let path = url.path().trim_matches('/');
    !path.is_empty() && path.split('/').count() >= 2
}

/// A project root ready for scanning.
///
/// When the root was cloned, the backing workspace lives as long as this
/// value and is deleted on [`LocatedSource::release`] or drop.
#[derive(Debug)]
pub struct LocatedSource {
    root: PathBuf,
    #[cfg(feature = "git")]
    workspace: Option<ScopedWorkspace>,
}

impl LocatedSource {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            #[cfg(feature = "git")]
            workspace: None,
        }
    }

    #[cfg(feature = "git")]
    pub fn remote(workspace: ScopedWorkspace) -> Self {
        Self {
            root: workspace.path().to_path_buf(),
            workspace: Some(workspace),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(feature = "git")]
    pub fn is_remote(&self) -> bool {
        self.workspace.is_some()
    }

    #[cfg(not(feature = "git"))]
    pub fn is_remote(&self) -> bool {
        false
    }

    /// Removes the backing workspace, if any.
    #[cfg(feature = "git")]
    pub fn release(self) {
        if let Some(workspace) = self.workspace {
            workspace.release();
        }
    }

    #[cfg(not(feature = "git"))]
    pub fn release(self) {}
}

/// Turns `input` into a [`LocatedSource`], cloning remote references.
///
/// # Errors
///
/// - [`DocgenError::SourceUnavailable`] if a remote reference cannot be cloned
/// - [`DocgenError::InvalidPath`] if a local path is missing or not a directory
pub fn locate(input: &str, branch: Option<&str>) -> Result<LocatedSource> {
    if is_remote_reference(input) {
        return locate_remote(input, branch);
    }

    let root = PathBuf::from(input);
    if !root.is_dir() {
        error!("Invalid directory path: {}", root.display());
        return Err(DocgenError::InvalidPath { path: root });
    }

    debug!("Using local directory: {}", root.display());
    Ok(LocatedSource::local(root))
}

#[cfg(feature = "git")]
fn locate_remote(url: &str, branch: Option<&str>) -> Result<LocatedSource> {
    let workspace = ScopedWorkspace::new().map_err(|e| DocgenError::SourceUnavailable {
        reference: url.to_string(),
        message: e.to_string(),
    })?;

    let options = CloneOptions {
        branch: branch.map(str::to_string),
        ..CloneOptions::default()
    };
    clone_into(workspace, url, &options)
}

/// Clones `url` into `workspace`, which is released again if the clone fails.
#[cfg(feature = "git")]
fn clone_into(
    workspace: ScopedWorkspace,
    url: &str,
    options: &CloneOptions,
) -> Result<LocatedSource> {
    match workspace.clone_repository(url, options) {
        Ok(()) => Ok(LocatedSource::remote(workspace)),
        Err(e) => {
            error!("Error cloning repository: {}", e);
            workspace.release();
            Err(e)
        }
    }
}

#[cfg(not(feature = "git"))]
fn locate_remote(url: &str, _branch: Option<&str>) -> Result<LocatedSource> {
    error!("Cannot clone {}: built without the `git` feature", url);
    Err(DocgenError::SourceUnavailable {
        reference: url.to_string(),
        message: "git support is not compiled in".to_string(),
    })
}
