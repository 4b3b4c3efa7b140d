//! Size bucketing and confirmed duplicate groups.
//!
//! # Overview
//!
//! Size grouping is the first stage of duplicate detection. Files with
//! different lengths can never be byte-identical, so every size bucket with a
//! single member is discarded here without touching file contents.
//!
//! Zero-length files are ordinary members of the size-0 bucket: all empty
//! files have identical (empty) content and group with each other.
//!
//! # Example
//!
//! ```
//! use dupefind::scanner::FileEntry;
//! use dupefind::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024, 0),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024, 1),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048, 2),
//! ];
//!
//! // Only buckets with 2+ files are potential duplicates
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// Statistics from the size-grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Files fed into grouping
    pub total_files: usize,
    /// Sum of their sizes in bytes
    pub total_size: u64,
    /// Distinct sizes seen
    pub unique_sizes: usize,
    /// Files discarded because no other file had their size
    pub eliminated_unique: usize,
    /// Files left in multi-member buckets
    pub potential_duplicates: usize,
    /// Number of multi-member buckets
    pub size_groups: usize,
}

impl GroupingStats {
    /// Percentage of input files eliminated by size alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Partition files by exact size, keeping only buckets with 2+ members.
///
/// Within each returned bucket files keep their input order.
#[must_use]
pub fn group_by_size(files: Vec<FileEntry>) -> (HashMap<u64, Vec<FileEntry>>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: files.len(),
        total_size: files.iter().map(|f| f.size).sum(),
        ..Default::default()
    };

    let mut by_size: HashMap<u64, Vec<FileEntry>> = HashMap::new();
    for file in files {
        by_size.entry(file.size).or_default().push(file);
    }
    stats.unique_sizes = by_size.len();

    by_size.retain(|size, bucket| {
        if bucket.len() < 2 {
            stats.eliminated_unique += bucket.len();
            log::trace!(
                "Eliminated unique size {}: {}",
                size,
                bucket[0].path.display()
            );
            false
        } else {
            stats.potential_duplicates += bucket.len();
            stats.size_groups += 1;
            true
        }
    });

    (by_size, stats)
}

/// A finalized set of files with pairwise byte-identical content.
///
/// Members are ordered by discovery index and never change after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Content digest shared by every member
    pub hash: Hash,
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Members in discovery order
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a group, ordering members by discovery index.
    #[must_use]
    pub fn new(hash: Hash, size: u64, mut files: Vec<FileEntry>) -> Self {
        debug_assert!(files.len() >= 2, "a duplicate group needs two members");
        debug_assert!(files.iter().all(|f| f.size == size));
        files.sort_by_key(|f| f.index);
        Self { hash, size, files }
    }

    /// Number of members.
    #[must_use]
    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// Number of members (alias of [`count`](Self::count)).
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Members beyond the first.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total size of all members.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Bytes reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Hex form of the content digest.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Discovery index of the earliest member.
    #[must_use]
    pub fn first_index(&self) -> usize {
        self.files.first().map_or(usize::MAX, |f| f.index)
    }

    /// Member paths in order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}
