//! Report emitter: the ordered result of one scan.
//!
//! Groups are finalized concurrently, so completion order carries no meaning.
//! [`emit`] fixes the order: members by discovery index, groups by their
//! earliest member. Two scans of an unchanged tree therefore produce the same
//! report regardless of how many workers built it.

use std::path::{Path, PathBuf};

use super::finder::ScanSummary;
use super::DuplicateGroup;
use crate::scanner::ScanError;

/// Put finalized groups into their deterministic emission order.
///
/// Groups with fewer than two members are dropped.
#[must_use]
pub fn emit(groups: Vec<DuplicateGroup>) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(|g| g.count() >= 2)
        .map(|mut g| {
            g.files.sort_by_key(|f| f.index);
            g
        })
        .collect();
    groups.sort_by_key(DuplicateGroup::first_index);
    groups
}

/// Complete result of a successful scan.
///
/// Owned by the caller; nothing in it is shared with any other scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Canonical root that was scanned (empty for pre-collected file lists)
    pub root: PathBuf,
    /// Confirmed duplicate groups in emission order
    pub groups: Vec<DuplicateGroup>,
    /// Soft failures, in the order they were recorded
    pub warnings: Vec<ScanError>,
    /// Scan statistics
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether any soft failure was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The result as an ordered list of absolute path lists.
    #[must_use]
    pub fn path_lists(&self) -> Vec<Vec<PathBuf>> {
        self.groups.iter().map(DuplicateGroup::paths).collect()
    }

    /// The result with every path made relative to the scanned root.
    #[must_use]
    pub fn relative_path_lists(&self) -> Vec<Vec<PathBuf>> {
        self.groups
            .iter()
            .map(|g| g.files.iter().map(|f| self.display_path(&f.path)).collect())
            .collect()
    }

    /// `path` relative to the root, or unchanged if it lies outside it.
    #[must_use]
    pub fn display_path(&self, path: &Path) -> PathBuf {
        if self.root.as_os_str().is_empty() {
            return path.to_path_buf();
        }
        path.strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }
}
