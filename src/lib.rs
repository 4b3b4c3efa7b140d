//! dupefind - duplicate file finder
//!
//! Finds groups of files with byte-identical content under a directory.
//! Candidates are narrowed in three stages: files are bucketed by size, same
//! size files are hashed on a bounded worker pool, and every digest bucket is
//! confirmed by byte comparison before it is reported. Groups and their
//! members come back in discovery order, so a rerun over an unchanged tree
//! produces the same report regardless of thread count.
//!
//! ```no_run
//! use dupefind::duplicates::FinderConfig;
//! use std::path::Path;
//!
//! let report = dupefind::find_duplicates(Path::new("."), FinderConfig::default()).unwrap();
//! for group in &report.groups {
//!     println!("{:?}", group.paths());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError, ScanReport};
use crate::error::ExitCode;
use crate::output::{json, CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;

/// Find every group of identical files under `root`.
///
/// # Errors
///
/// Fails if `root` is missing or not a directory, if the scan is cancelled
/// through the configured shutdown flag, or if the worker pool cannot be
/// started. Unreadable files and subtrees are not errors; they are recorded in
/// [`ScanReport::warnings`].
pub fn find_duplicates(root: &Path, config: FinderConfig) -> Result<ScanReport, FinderError> {
    DuplicateFinder::new(config).find_duplicates(root)
}

/// Run the command-line application, writing the report to stdout.
///
/// # Errors
///
/// Returns an error for fatal failures; the caller maps it to an exit code
/// with [`ExitCode::for_error`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_app_with_writer(cli, &mut out)
}

/// Run the command-line application, writing the report to `out`.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with_writer<W: Write>(cli: Cli, out: &mut W) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            out.write_all(config.to_toml()?.as_bytes())
                .context("Failed to write configuration")?;
            Ok(ExitCode::Success)
        }
        Commands::Scan(args) => {
            config.apply_scan_args(&args);
            run_scan(&args, &config, cli.quiet, out)
        }
    }
}

fn run_scan<W: Write>(
    args: &ScanArgs,
    config: &Config,
    quiet: bool,
    out: &mut W,
) -> Result<ExitCode> {
    let handler = signal::install_handler();
    let mut finder_config = config.finder_config().with_shutdown_flag(handler.flag());

    if config.output == OutputFormat::Text && config.progress && !quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    log::debug!("Effective configuration: {:?}", config);

    let report = find_duplicates(&args.path, finder_config)
        .with_context(|| format!("Scan of {} failed", args.path.display()))?;
    let exit_code = ExitCode::for_report(&report);

    for warning in &report.warnings {
        log::warn!("{}", warning);
    }

    write_report(&report, config.output, args, exit_code, out)?;

    log::info!(
        "{} duplicate groups, {} reclaimable",
        report.summary.duplicate_groups,
        report.summary.reclaimable_display()
    );
    Ok(exit_code)
}

fn write_report<W: Write>(
    report: &ScanReport,
    format: OutputFormat,
    args: &ScanArgs,
    exit_code: ExitCode,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => TextOutput::new(report, args.relative)
            .write_to(out)
            .context("Failed to write report")?,
        OutputFormat::Json if args.groups_only => {
            json::write_groups_only(report, out, args.relative, true)?;
        }
        OutputFormat::Json => {
            JsonOutput::new(report, exit_code, args.relative).write_to(out, true)?;
        }
        OutputFormat::Csv => CsvOutput::new(report, args.relative).write_to(&mut *out)?,
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}
