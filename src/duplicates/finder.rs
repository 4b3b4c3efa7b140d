//! Duplicate finder implementation with a three-stage funnel.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect every regular file under the root, in discovery order
//! 2. **Size**: bucket by exact size, discard singleton buckets
//!    (see [`crate::duplicates::groups`])
//! 3. **Digest**: stream each candidate through the content digest, bucket by
//!    `(size, digest)`, discard singleton buckets
//! 4. **Compare**: confirm each digest bucket byte-for-byte
//!    (see [`crate::duplicates::confirm`])
//!
//! Digest and compare work runs on a rayon pool bounded by
//! [`FinderConfig::max_concurrency`]. The digest cache is created per scan and
//! dropped with it.
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_max_concurrency(4));
//! let report = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for group in &report.groups {
//!     println!("{:?}", group.paths());
//! }
//! for warning in &report.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::confirm::{partition_identical, Confirmation};
use super::report::{self, ScanReport};
use super::{group_by_size, DuplicateGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{
    ContentDigest, DigestCache, FileEntry, Hash, HashAlgorithm, HashError, Hasher, ScanError,
    Walker, WalkerConfig, DEFAULT_CHUNK_SIZE,
};

/// Configuration for the duplicate finder.
///
/// Every option has a default; a `FinderConfig::default()` scan reports every
/// regular file under the root.
#[derive(Clone)]
pub struct FinderConfig {
    /// Upper bound on worker threads for traversal, digesting and comparing.
    /// Defaults to the number of available execution units.
    pub max_concurrency: usize,
    /// Read buffer size for digesting and comparing (bytes).
    pub chunk_size: usize,
    /// Built-in digest function.
    pub hash_algorithm: HashAlgorithm,
    /// Custom digest function, overriding `hash_algorithm` when set.
    pub digest: Option<Arc<dyn ContentDigest>>,
    /// Walker configuration (symlinks, hidden files, size and ignore filters).
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for cancellation.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("max_concurrency", &self.max_concurrency)
            .field("chunk_size", &self.chunk_size)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("digest", &self.digest.as_ref().map(|d| d.name()))
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash_algorithm: HashAlgorithm::default(),
            digest: None,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

/// Number of available execution units, at least 1.
#[must_use]
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

impl FinderConfig {
    /// Set whether symbolic links to files are reported.
    #[must_use]
    pub fn with_follow_file_symlinks(mut self, follow: bool) -> Self {
        self.walker_config.follow_file_symlinks = follow;
        self
    }

    /// Whether symbolic links to files are reported.
    #[must_use]
    pub fn follow_file_symlinks(&self) -> bool {
        self.walker_config.follow_file_symlinks
    }

    /// Set the worker thread bound (minimum 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, threads: usize) -> Self {
        self.max_concurrency = threads.max(1);
        self
    }

    /// Set the read chunk size (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the built-in digest function.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Use a custom digest function.
    #[must_use]
    pub fn with_digest(mut self, digest: Arc<dyn ContentDigest>) -> Self {
        self.digest = Some(digest);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for cancellation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Files eliminated by digest bucketing (unique digests)
    pub eliminated_by_digest: usize,
    /// Distinct contents found behind a shared digest
    pub digest_collisions: usize,
    /// Bytes streamed through the digest function
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding the first of each group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of scanned bytes taken up by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        format_size(self.reclaimable_space)
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte size as a human-readable string.
pub(crate) fn format_size(bytes: u64) -> String {
    bytesize::ByteSize::b(bytes).to_string()
}

/// Errors that abort a scan.
///
/// Soft failures never appear here; they are collected in
/// [`ScanReport::warnings`].
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by the cancellation signal.
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be resolved.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("Failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Duplicate finder that runs the detection pipeline.
///
/// Each call to [`find_duplicates`](Self::find_duplicates) is independent:
/// the digest cache and worker pool live only for that call.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl std::fmt::Debug for DuplicateFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish()
    }
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let digest = config
            .digest
            .clone()
            .unwrap_or_else(|| config.hash_algorithm.digest());
        let mut hasher = Hasher::new()
            .with_digest(digest)
            .with_chunk_size(config.chunk_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `root`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist, or is not a directory (nothing is scanned)
    /// - The scan is interrupted by the shutdown flag (no partial result)
    /// - The worker pool cannot be created
    pub fn find_duplicates(&self, root: &Path) -> Result<ScanReport, FinderError> {
        let start_time = Instant::now();

        if !root.exists() {
            return Err(FinderError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }
        let root = root.canonicalize().map_err(|source| FinderError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        log::info!("Starting duplicate scan of {}", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (files, warnings) = self.walk(&root)?;

        let mut report = self.run_pipeline(files, warnings, start_time)?;
        report.root = root;
        Ok(report)
    }

    /// Find duplicates among a pre-collected list of files.
    ///
    /// Discovery order is taken from each entry's `index`. The returned
    /// report has an empty `root`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] on cancellation and
    /// [`FinderError::ThreadPool`] if the worker pool cannot be created.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<ScanReport, FinderError> {
        self.run_pipeline(files, Vec::new(), Instant::now())
    }

    /// Walk the tree, splitting results into files and warnings.
    fn walk(&self, root: &Path) -> Result<(Vec<FileEntry>, Vec<ScanError>), FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let walker_config = self
            .config
            .walker_config
            .clone()
            .with_threads(self.config.max_concurrency);
        let mut walker = Walker::new(root, walker_config);
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => warnings.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            log::info!("Walk interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Found {} files, {} warnings",
            files.len(),
            warnings.len()
        );
        Ok((files, warnings))
    }

    /// Size, digest and compare stages over an already-walked file list.
    fn run_pipeline(
        &self,
        files: Vec<FileEntry>,
        mut warnings: Vec<ScanError>,
        start_time: Instant,
    ) -> Result<ScanReport, FinderError> {
        let mut summary = ScanSummary::default();

        let (size_groups, size_stats) = group_by_size(files);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Size stage: {} files ({}) → {} candidates ({:.1}% eliminated)",
            size_stats.total_files,
            format_size(size_stats.total_size),
            size_stats.potential_duplicates,
            size_stats.elimination_rate()
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut groups = Vec::new();
        if !size_groups.is_empty() {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_concurrency)
                .thread_name(|i| format!("dupefind-worker-{i}"))
                .build()?;
            log::debug!("Worker pool ready with {} threads", pool.current_num_threads());

            let mut candidates: Vec<FileEntry> = size_groups.into_values().flatten().collect();
            candidates.sort_by_key(|f| f.index);

            let cache = DigestCache::with_capacity(candidates.len());
            let buckets =
                self.digest_stage(&pool, candidates, &cache, &mut summary, &mut warnings)?;
            groups = self.compare_stage(&pool, buckets, &mut summary, &mut warnings)?;
        }

        let groups = report::emit(groups);
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok(ScanReport {
            root: PathBuf::new(),
            groups,
            warnings,
            summary,
        })
    }

    /// Digest every candidate and bucket by `(size, digest)`.
    ///
    /// Returns only buckets with 2+ members, ordered by earliest member.
    fn digest_stage(
        &self,
        pool: &rayon::ThreadPool,
        candidates: Vec<FileEntry>,
        cache: &DigestCache,
        summary: &mut ScanSummary,
        warnings: &mut Vec<ScanError>,
    ) -> Result<Vec<(Hash, Vec<FileEntry>)>, FinderError> {
        let total = candidates.len();
        log::info!(
            "Digest stage: hashing {} files with {}",
            total,
            self.hasher.digest_name()
        );
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("digest", total);
        }

        let done = AtomicUsize::new(0);
        let results: Vec<(FileEntry, Result<Hash, HashError>)> = pool.install(|| {
            candidates
                .into_par_iter()
                .map(|file| {
                    if self.config.is_shutdown_requested() {
                        return (file, Err(HashError::Interrupted));
                    }
                    let result = cache.digest_of(&file, &self.hasher);
                    if let Some(ref callback) = self.config.progress_callback {
                        let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(current, file.path.to_string_lossy().as_ref());
                        callback.on_item_completed(file.size);
                    }
                    (file, result)
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("digest");
        }

        if self.config.is_shutdown_requested()
            || results
                .iter()
                .any(|(_, r)| matches!(r, Err(HashError::Interrupted)))
        {
            log::info!("Digest stage interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let mut buckets: HashMap<(u64, Hash), Vec<FileEntry>> = HashMap::new();
        for (file, result) in results {
            match result {
                Ok(hash) => {
                    summary.bytes_hashed += file.size;
                    buckets.entry((file.size, hash)).or_default().push(file);
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", file.path.display(), e);
                    warnings.push(ScanError::Hash(e));
                }
            }
        }

        let mut kept: Vec<(Hash, Vec<FileEntry>)> = Vec::new();
        for ((_, hash), bucket) in buckets {
            if bucket.len() < 2 {
                summary.eliminated_by_digest += bucket.len();
                log::trace!("Eliminated unique digest: {}", bucket[0].path.display());
            } else {
                kept.push((hash, bucket));
            }
        }
        // Buckets keep input order, so the first member has the lowest index
        kept.sort_by_key(|(_, bucket)| bucket[0].index);

        log::info!(
            "Digest stage complete: {} candidate buckets, {} files eliminated",
            kept.len(),
            summary.eliminated_by_digest
        );
        Ok(kept)
    }

    /// Confirm each digest bucket by byte comparison.
    fn compare_stage(
        &self,
        pool: &rayon::ThreadPool,
        buckets: Vec<(Hash, Vec<FileEntry>)>,
        summary: &mut ScanSummary,
        warnings: &mut Vec<ScanError>,
    ) -> Result<Vec<DuplicateGroup>, FinderError> {
        let total = buckets.len();
        log::info!("Compare stage: confirming {} buckets", total);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("compare", total);
        }

        let done = AtomicUsize::new(0);
        let results: Vec<(Hash, u64, Result<Confirmation, HashError>)> = pool.install(|| {
            buckets
                .into_par_iter()
                .map(|(hash, bucket)| {
                    let size = bucket[0].size;
                    let label = bucket[0].path.to_string_lossy().into_owned();
                    let outcome = if self.config.is_shutdown_requested() {
                        Err(HashError::Interrupted)
                    } else {
                        partition_identical(bucket, &self.hasher)
                    };
                    if let Some(ref callback) = self.config.progress_callback {
                        let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(current, &label);
                    }
                    (hash, size, outcome)
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("compare");
        }

        if self.config.is_shutdown_requested() {
            log::info!("Compare stage interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let mut groups = Vec::new();
        for (hash, size, outcome) in results {
            let confirmation = match outcome {
                Ok(c) => c,
                Err(HashError::Interrupted) => return Err(FinderError::Interrupted),
                Err(e) => {
                    warnings.push(ScanError::Hash(e));
                    continue;
                }
            };
            if confirmation.collisions > 0 {
                log::debug!(
                    "Digest {} covered {} distinct contents",
                    crate::scanner::hash_to_hex(&hash),
                    confirmation.collisions + 1
                );
            }
            summary.digest_collisions += confirmation.collisions;
            warnings.extend(confirmation.failures.into_iter().map(ScanError::Hash));
            groups.extend(
                confirmation
                    .classes
                    .into_iter()
                    .map(|members| DuplicateGroup::new(hash, size, members)),
            );
        }

        log::info!("Compare stage complete: {} groups confirmed", groups.len());
        Ok(groups)
    }
}
