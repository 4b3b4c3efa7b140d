//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Digest bucketing of same-size files
//! - Byte-exact confirmation with union-find
//! - Deterministic report emission

pub mod confirm;
pub mod finder;
pub mod groups;
pub mod report;

pub use confirm::{partition_identical, Confirmation, DisjointSet};
pub use finder::{default_concurrency, DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats};
pub use report::{emit, ScanReport};
