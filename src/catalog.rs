//! Immutable catalog of discovered images.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Error;
use crate::scan::{ScanOptions, scan};

/// One discovered image: its position in the catalog and its resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    index: usize,
    path: PathBuf,
}

impl ImageEntry {
    /// Position of this entry within its catalog.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Resolved file path, handed to the decoder.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Ordered, de-duplicated list of images found under a root. Never empty.
#[derive(Debug)]
pub struct ImageCatalog {
    root: PathBuf,
    entries: Vec<Arc<ImageEntry>>,
}

impl ImageCatalog {
    /// Scan `root` and build the catalog.
    ///
    /// # Errors
    /// Returns [`Error::BadRoot`] if `root` is missing and [`Error::EmptyCatalog`] if
    /// no matching file was found.
    pub fn build(root: impl AsRef<Path>, opts: &ScanOptions) -> Result<Self, Error> {
        let root = root.as_ref();
        let report = scan(root, opts)?;
        if report.skipped > 0 {
            warn!(
                root = %root.display(),
                skipped = report.skipped,
                "some entries could not be read during scan"
            );
        }
        let catalog = Self::from_paths(root, report.paths)?;
        info!(root = %root.display(), count = catalog.len(), "image catalog built");
        Ok(catalog)
    }

    /// Build a catalog from an already collected list of paths.
    ///
    /// Duplicates are dropped and the order is made stable by sorting.
    ///
    /// # Errors
    /// Returns [`Error::EmptyCatalog`] if `paths` is empty.
    pub fn from_paths<I>(root: impl Into<PathBuf>, paths: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let root = root.into();
        let unique: BTreeSet<PathBuf> = paths.into_iter().collect();
        if unique.is_empty() {
            return Err(Error::EmptyCatalog { root });
        }
        let entries = unique
            .into_iter()
            .enumerate()
            .map(|(index, path)| Arc::new(ImageEntry { index, path }))
            .collect();
        Ok(Self { root, entries })
    }

    /// Directory the catalog was built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of entries (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; construction rejects empty catalogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the entry at `index`.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn entry_at(&self, index: usize) -> Result<&Arc<ImageEntry>, Error> {
        self.entries.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Iterate entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ImageEntry>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/lib/{n}"))).collect()
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = ImageCatalog::from_paths("/lib", Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog { ref root } if root == Path::new("/lib")));
    }

    #[test]
    fn duplicates_collapse_and_indices_follow_order() {
        let cat = ImageCatalog::from_paths("/lib", paths(&["b.jpg", "a.jpg", "b.jpg"])).unwrap();
        assert_eq!(cat.len(), 2);
        let names: Vec<_> = cat.iter().map(|e| (e.index(), e.path().to_path_buf())).collect();
        assert_eq!(
            names,
            vec![
                (0, PathBuf::from("/lib/a.jpg")),
                (1, PathBuf::from("/lib/b.jpg"))
            ]
        );
    }

    #[test]
    fn entry_at_checks_bounds() {
        let cat = ImageCatalog::from_paths("/lib", paths(&["a.jpg"])).unwrap();
        assert_eq!(cat.entry_at(0).unwrap().path(), Path::new("/lib/a.jpg"));
        let err = cat.entry_at(1).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 1, len: 1 }));
    }
}
