//! CSV output formatter for scan reports.
//!
//! One row is generated for each member of each duplicate group.
//!
//! # Columns
//!
//! - `group_id`: 1-based position of the group in the report
//! - `hash`: content digest (hexadecimal)
//! - `size`: file size in bytes
//! - `path`: member path (absolute, or relative to the root)

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::ScanReport;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    hash: &'a str,
    size: u64,
    path: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    report: &'a ScanReport,
    relative: bool,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(report: &'a ScanReport, relative: bool) -> Self {
        Self { report, relative }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if self.report.groups.is_empty() {
            csv_writer.write_record(["group_id", "hash", "size", "path"])?;
        }

        for (idx, group) in self.report.groups.iter().enumerate() {
            let hash_hex = group.hash_hex();
            for file in &group.files {
                let path = if self.relative {
                    self.report.display_path(&file.path)
                } else {
                    file.path.clone()
                };
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    hash: &hash_hex,
                    size: group.size,
                    path: path.to_string_lossy().into_owned(),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
