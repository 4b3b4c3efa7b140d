//! Output formatters for scan reports.
//!
//! This module provides different output formats for a [`ScanReport`]:
//! - Text for terminals
//! - JSON for automation and scripting (full report or bare path lists)
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::DuplicateFinder;
//! use dupefind::error::ExitCode;
//! use dupefind::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! let output = JsonOutput::new(&report, ExitCode::for_report(&report), false);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```
//!
//! [`ScanReport`]: crate::duplicates::ScanReport

pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
