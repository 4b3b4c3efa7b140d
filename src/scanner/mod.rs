//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Streaming content digests (BLAKE3 or SHA-256)
//! - Streamed byte-for-byte comparison
//! - A scan-scoped digest cache
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Chunked digests and byte comparison
//! - [`fingerprint`]: Size/digest fingerprints cached per scan
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod fingerprint;
pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};
use std::sync::Arc;

// Re-export main types
pub use fingerprint::{DigestCache, Fingerprint};
pub use hasher::{
    hash_to_hex, hex_to_hash, ContentDigest, DigestState, Hash, HashAlgorithm, Hasher,
    DEFAULT_CHUNK_SIZE,
};
pub use walker::Walker;

/// A regular file discovered by the walker.
///
/// Entries are immutable once created and live only for the duration of a
/// single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file (the link's own path for symlinks)
    pub path: PathBuf,
    /// File size in bytes (of the target, for symlinks)
    pub size: u64,
    /// Position in the walker's deterministic discovery order
    pub index: usize,
    /// Whether this entry is a symbolic link resolved to a file
    pub is_symlink: bool,
}

impl FileEntry {
    /// Create a new FileEntry.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `index` - Discovery order of the file within its scan
    #[must_use]
    pub fn new(path: PathBuf, size: u64, index: usize) -> Self {
        Self {
            path,
            size,
            index,
            is_symlink: false,
        }
    }
}

/// Configuration for directory walking.
///
/// Every filter here is opt-in. With the default configuration the walker
/// reports every regular file, hidden ones included.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Report symbolic links to files, hashed through their target.
    /// Symbolic links to directories are never followed.
    pub follow_file_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (gitignore syntax, relative to the root).
    pub ignore_patterns: Vec<String>,

    /// Number of threads used for reading directories.
    pub threads: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_file_symlinks: true,
            skip_hidden: false,
            min_size: None,
            max_size: None,
            ignore_patterns: Vec::new(),
            threads: 1,
        }
    }
}

impl WalkerConfig {
    /// Set whether symbolic links to files are reported.
    #[must_use]
    pub fn with_follow_file_symlinks(mut self, follow: bool) -> Self {
        self.follow_file_symlinks = follow;
        self
    }

    /// Set whether hidden entries are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Set the size filters.
    #[must_use]
    pub fn with_size_range(mut self, min_size: Option<u64>, max_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Set the ignore patterns.
    #[must_use]
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Set the directory-reading thread count (minimum 1).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

/// Whether a warning concerns a whole subtree or a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A directory could not be listed; its subtree was skipped.
    Subtree,
    /// A file could not be stat'ed or read; it was excluded from all groups.
    File,
}

impl WarningKind {
    /// Short machine-readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subtree => "subtree",
            Self::File => "file",
        }
    }
}

/// Soft failures recorded during a scan.
///
/// None of these abort the scan; they are collected and returned next to the
/// result.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// A directory could not be read; traversal of its subtree stopped.
    #[error("Cannot read directory {path}: {source}")]
    Subtree {
        /// Directory that could not be listed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A file's metadata could not be read.
    #[error("Cannot stat {path}: {source}")]
    Stat {
        /// Path of the file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A file could not be opened or read while fingerprinting or comparing.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl ScanError {
    /// Classify this warning.
    #[must_use]
    pub fn kind(&self) -> WarningKind {
        match self {
            Self::Subtree { .. } => WarningKind::Subtree,
            Self::Stat { .. } | Self::Hash(_) => WarningKind::File,
        }
    }

    /// Path the warning refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Subtree { path, .. } | Self::Stat { path, .. } => path,
            Self::Hash(e) => e.path().unwrap_or_else(|| Path::new("")),
        }
    }
}

/// Errors that can occur while reading file contents.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Reading stopped because cancellation was requested.
    #[error("Read interrupted by shutdown request")]
    Interrupted,
}

impl HashError {
    /// Build a hash error from an I/O error, classifying common kinds.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path of the file that failed, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => Some(p),
            Self::Io { path, .. } => Some(path),
            Self::Interrupted => None,
        }
    }
}
