//! JSON output formatter for scan reports.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/data",
//!   "groups": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "count": 2,
//!       "files": ["/data/a/file1.txt", "/data/b/file1.txt"]
//!     }
//!   ],
//!   "warnings": [
//!     { "kind": "subtree", "path": "/data/locked", "message": "..." }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_groups": 5,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "DF000"
//!   }
//! }
//! ```
//!
//! With `--groups-only` the output is just the list of path lists:
//!
//! ```json
//! [["/data/a/file1.txt", "/data/b/file1.txt"]]
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanReport, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::ScanError;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Content digest as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Number of members
    pub count: usize,
    /// Member paths in discovery order
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Convert a group, rendering each path with `render`.
    fn from_group(group: &DuplicateGroup, render: impl Fn(&Path) -> String) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            count: group.count(),
            files: group.files.iter().map(|f| render(&f.path)).collect(),
        }
    }
}

/// A soft failure in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonWarning {
    /// `subtree` or `file`
    pub kind: &'static str,
    /// Affected path
    pub path: String,
    /// Human-readable cause
    pub message: String,
}

impl From<&ScanError> for JsonWarning {
    fn from(warning: &ScanError) -> Self {
        Self {
            kind: warning.kind().as_str(),
            path: warning.path().to_string_lossy().into_owned(),
            message: warning.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Files eliminated by size grouping
    pub eliminated_by_size: usize,
    /// Files eliminated by digest bucketing
    pub eliminated_by_digest: usize,
    /// Distinct contents found behind a shared digest
    pub digest_collisions: usize,
    /// Bytes streamed through the digest function
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding the first of each group)
    pub duplicate_files: usize,
    /// Space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            eliminated_by_digest: summary.eliminated_by_digest,
            digest_collisions: summary.digest_collisions,
            bytes_hashed: summary.bytes_hashed,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Scanned root
    pub root: String,
    /// Duplicate groups in emission order
    pub groups: Vec<JsonDuplicateGroup>,
    /// Soft failures
    pub warnings: Vec<JsonWarning>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create JSON output for a report.
    ///
    /// With `relative`, member paths are made relative to the scanned root.
    #[must_use]
    pub fn new(report: &ScanReport, exit_code: ExitCode, relative: bool) -> Self {
        let render = |p: &Path| render_path(report, p, relative);
        Self {
            root: report.root.to_string_lossy().into_owned(),
            groups: report
                .groups
                .iter()
                .map(|g| JsonDuplicateGroup::from_group(g, &render))
                .collect(),
            warnings: report.warnings.iter().map(JsonWarning::from).collect(),
            summary: JsonSummary::from_scan_summary(&report.summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// The bare result shape: an ordered list of path lists.
#[must_use]
pub fn groups_only(report: &ScanReport, relative: bool) -> Vec<Vec<String>> {
    report
        .groups
        .iter()
        .map(|g| {
            g.files
                .iter()
                .map(|f| render_path(report, &f.path, relative))
                .collect()
        })
        .collect()
}

/// Write the bare result shape as JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_groups_only<W: Write>(
    report: &ScanReport,
    writer: &mut W,
    relative: bool,
    pretty: bool,
) -> Result<(), JsonOutputError> {
    let lists = groups_only(report, relative);
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &lists)?;
    } else {
        serde_json::to_writer(&mut *writer, &lists)?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}

fn render_path(report: &ScanReport, path: &Path, relative: bool) -> String {
    if relative {
        report.display_path(path).to_string_lossy().into_owned()
    } else {
        path.to_string_lossy().into_owned()
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
