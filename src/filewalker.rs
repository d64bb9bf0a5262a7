use ignore::WalkBuilder;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Default number of directory levels below the root that are scanned.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Controls which files [`collect_source_files`] returns.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Files are collected from directories whose depth below the root is
    /// strictly less than this value. The root itself has depth 0.
    pub max_depth: usize,
    /// File extension without the leading dot.
    pub extension: String,
    /// Apply `.gitignore`, `.ignore` and global git excludes while walking.
    pub respect_gitignore: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            extension: "py".to_string(),
            respect_gitignore: false,
        }
    }
}

/// Collects source files under `root` in traversal order.
///
/// Entries that cannot be read are logged and skipped.
pub fn collect_source_files(root: &Path, options: &DiscoveryOptions) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);

    builder
        .standard_filters(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .ignore(options.respect_gitignore)
        .require_git(false)
        // A file at entry depth `max_depth` sits in a directory of depth
        // `max_depth - 1`, the deepest directory still within bounds.
        .max_depth(Some(options.max_depth))
        .sort_by_file_name(|a, b| a.cmp(b));

    let suffix = format!(".{}", options.extension);
    let mut files = Vec::new();

    for result in builder.build() {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && has_suffix(path, &suffix) {
                    debug!("Discovered: {}", path.display());
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!("Error walking path: {err}");
            }
        }
    }

    files
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}
