//! Directory scanning utilities for discovering image files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// Extensions recognised when no override is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg"];

/// Options controlling directory scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional maximum recursion depth. `None` or `Some(0)` means unlimited.
    pub max_depth: Option<usize>,
    /// Stop once this many unique images were found. `None` means unlimited.
    pub max_files: Option<usize>,
    /// Allowed extensions (compared case-insensitively, without dot).
    pub exts: Vec<String>,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Skip dot-directories below the root.
    pub skip_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: None,
            max_files: None,
            exts: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            follow_links: true,
            skip_hidden: true,
        }
    }
}

/// Outcome of a scan: unique canonical paths plus the number of unreadable entries.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Canonical image paths, sorted and free of duplicates.
    pub paths: Vec<PathBuf>,
    /// Directory entries that could not be read (permissions, broken links, loops).
    pub skipped: usize,
}

/// Return `true` if `path` has one of the allowed extensions.
#[must_use]
pub fn is_supported_image<S: AsRef<str>>(path: &Path, exts: &[S]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| exts.iter().any(|e| e.as_ref().eq_ignore_ascii_case(ext)))
}

/// Walk `root` and collect every regular file with an allowed extension.
///
/// A plain file as `root` is treated as a one-entry tree. Paths are canonicalised
/// before de-duplication so the same file reached through several links is listed
/// once.
///
/// # Errors
/// Returns [`Error::BadRoot`] if `root` does not exist.
pub fn scan(root: &Path, opts: &ScanOptions) -> Result<ScanReport, Error> {
    if !root.exists() {
        return Err(Error::BadRoot(root.to_path_buf()));
    }

    // sorted walk so a file cap keeps the same subset every run
    let mut wd = WalkDir::new(root)
        .follow_links(opts.follow_links)
        .sort_by_file_name();
    if !opts.recursive {
        wd = wd.max_depth(1);
    } else if let Some(d) = opts.max_depth
        && d > 0
    {
        wd = wd.max_depth(d);
    }

    let mut unique = BTreeSet::new();
    let mut skipped = 0usize;
    let limit = opts.max_files.unwrap_or(usize::MAX);
    for entry in wd
        .into_iter()
        .filter_entry(|e| !(opts.skip_hidden && is_hidden_dir(e)))
    {
        if unique.len() >= limit {
            debug!(limit, "file limit reached; scan stopped");
            break;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skipped += 1;
                warn!(path = ?err.path(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !is_supported_image(path, &opts.exts) {
            continue;
        }
        match path.canonicalize() {
            Ok(resolved) => {
                if !unique.insert(resolved) {
                    debug!(path = %path.display(), "duplicate image reference");
                }
            }
            Err(err) => {
                skipped += 1;
                warn!(path = %path.display(), error = %err, "cannot resolve image path");
            }
        }
    }

    Ok(ScanReport {
        paths: unique.into_iter().collect(),
        skipped,
    })
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}
