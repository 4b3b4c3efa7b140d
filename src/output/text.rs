//! Human-readable terminal output.
//!
//! Colors come from `yansi` and are switched off globally by `--no-color`
//! (see [`crate::run_app`]). Sizes use IEC units via `bytesize`.

use std::io::{self, Write};
use std::path::PathBuf;

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::ScanReport;

/// Text formatter for a scan report.
pub struct TextOutput<'a> {
    report: &'a ScanReport,
    relative: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(report: &'a ScanReport, relative: bool) -> Self {
        Self { report, relative }
    }

    fn render(&self, path: &std::path::Path) -> PathBuf {
        if self.relative {
            self.report.display_path(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Write groups, warnings and the summary line.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let report = self.report;

        for (idx, group) in report.groups.iter().enumerate() {
            let hash = group.hash_hex();
            writeln!(
                writer,
                "{} {} files, {} each ({})",
                format!("Group {}:", idx + 1).bold(),
                group.count(),
                ByteSize::b(group.size),
                (&hash[..12]).dim()
            )?;
            for file in &group.files {
                writeln!(writer, "  {}", self.render(&file.path).display())?;
            }
            writeln!(writer)?;
        }

        if report.has_warnings() {
            writeln!(
                writer,
                "{}",
                format!("Warnings ({}):", report.warnings.len()).yellow().bold()
            )?;
            for warning in &report.warnings {
                writeln!(writer, "  [{}] {}", warning.kind().as_str(), warning)?;
            }
            writeln!(writer)?;
        }

        let summary = &report.summary;
        if report.is_empty() {
            writeln!(
                writer,
                "No duplicates found among {} files ({}).",
                summary.total_files,
                ByteSize::b(summary.total_size)
            )?;
        } else {
            writeln!(
                writer,
                "{} duplicate groups, {} duplicate files, {} reclaimable ({:.1}% of {} in {} files).",
                summary.duplicate_groups.green().bold(),
                summary.duplicate_files,
                ByteSize::b(summary.reclaimable_space).to_string().green(),
                summary.wasted_percentage(),
                ByteSize::b(summary.total_size),
                summary.total_files
            )?;
        }
        writeln!(
            writer,
            "Scanned in {:.2}s, {} hashed.",
            summary.scan_duration.as_secs_f64(),
            ByteSize::b(summary.bytes_hashed)
        )
    }

    /// Render the report to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if formatting fails.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
