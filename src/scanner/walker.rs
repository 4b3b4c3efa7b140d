//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting every regular file for duplicate detection. It uses
//! [`jwalk`] to read directories on a bounded thread pool while still
//! streaming results in a deterministic order.
//!
//! # Behavior
//!
//! - Children are sorted by name at every level, so an unchanged tree always
//!   yields the same sequence of entries
//! - Symbolic links to directories are never followed (no cycles)
//! - Symbolic links to files are reported under the link's own path, sized
//!   and later hashed through their target (configurable)
//! - Hidden entries are included unless [`WalkerConfig::skip_hidden`] is set
//! - Unreadable directories yield a [`ScanError::Subtree`] and the walk
//!   continues with their siblings
//! - Files whose metadata cannot be read yield a [`ScanError::Stat`]
//! - Once the shutdown flag is raised no further directories are expanded
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: Some(1024),
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::{Parallelism, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for deterministic file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback, notified once per discovered file
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops expanding directories
    /// and stops yielding entries.
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

    /// Build the ignore matcher from the configured patterns.
    ///
    /// No `.gitignore` file is read implicitly; only explicit patterns apply.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results in discovery order;
    /// each entry's `index` is its position in that order. Soft failures are
    /// yielded as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let gitignore = Arc::new(self.build_gitignore());
        let prune_root = self.root.clone();
        let prune_flag = self.shutdown_flag.clone();
        let mut next_index = 0usize;

        let parallelism = if self.config.threads <= 1 {
            Parallelism::Serial
        } else {
            Parallelism::RayonNewPool(self.config.threads)
        };

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .parallelism(parallelism)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Stop expanding the tree once cancellation is requested
                if prune_flag
                    .as_ref()
                    .is_some_and(|f| f.load(Ordering::SeqCst))
                {
                    children.clear();
                    return;
                }

                if let Some(gi) = gitignore.as_ref() {
                    children.retain(|child| match child {
                        Ok(entry) => {
                            let path = entry.path();
                            let is_dir = entry.file_type().is_dir();
                            let ignored = is_ignored(gi, &prune_root, &path, is_dir);
                            if ignored {
                                log::trace!("Ignoring: {}", path.display());
                            }
                            !ignored
                        }
                        Err(_) => true,
                    });
                }

                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(mut entry) => {
                    let path = entry.path();
                    let file_type = entry.file_type();

                    // jwalk reports a failed read_dir on the directory's own
                    // entry, the root included
                    if entry.depth == 0 || file_type.is_dir() {
                        return entry
                            .read_children_error
                            .take()
                            .map(|e| Err(self.subtree_error(path, e)));
                    }

                    let is_symlink = file_type.is_symlink();
                    if is_symlink && !self.config.follow_file_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    // Symlinks are sized through their target
                    let metadata = if is_symlink {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    let metadata = match metadata {
                        Ok(m) => m,
                        Err(e) => return Some(Err(self.stat_error(path, e))),
                    };

                    let file = self.process_file_entry(path, &metadata, is_symlink, next_index)?;
                    next_index += 1;

                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(next_index, file.path.to_string_lossy().as_ref());
                    }

                    Some(Ok(file))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.subtree_error(path, e)))
                }
            })
    }

    /// Create a FileEntry if the entry is a regular file passing all filters.
    fn process_file_entry(
        &self,
        path: PathBuf,
        metadata: &Metadata,
        is_symlink: bool,
        index: usize,
    ) -> Option<FileEntry> {
        if !metadata.is_file() {
            if is_symlink && metadata.is_dir() {
                log::trace!("Not following directory symlink: {}", path.display());
            } else {
                log::trace!("Skipping non-regular file: {}", path.display());
            }
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        Some(FileEntry {
            path,
            size,
            index,
            is_symlink,
        })
    }

    /// Record a file whose metadata could not be read.
    fn stat_error(&self, path: PathBuf, error: io::Error) -> ScanError {
        if error.kind() == io::ErrorKind::NotFound {
            log::debug!("File vanished or dangling link: {}", path.display());
        } else {
            log::warn!("Cannot stat {}: {}", path.display(), error);
        }
        ScanError::Stat {
            path,
            source: Arc::new(error),
        }
    }

    /// Record a directory whose children could not be read.
    fn subtree_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Skipping unreadable directory {}: {}", path.display(), error);
        let message = error.to_string();
        let source = error
            .into_io_error()
            .unwrap_or_else(|| io::Error::other(message));
        ScanError::Subtree {
            path,
            source: Arc::new(source),
        }
    }
}

/// Match a path against the ignore set, relative to the walk root.
fn is_ignored(gitignore: &Gitignore, root: &Path, path: &Path, is_dir: bool) -> bool {
    let relative_path = path.strip_prefix(root).unwrap_or(path);

    // Gitignore matching uses forward slashes even on Windows.
    let path_str = relative_path.to_string_lossy();
    let normalized_path = if cfg!(windows) {
        path_str.replace('\\', "/")
    } else {
        path_str.into_owned()
    };

    gitignore.matched(normalized_path, is_dir).is_ignore()
}
