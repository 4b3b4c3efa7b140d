//! Chunked content hashing and byte comparison.
//!
//! # Overview
//! This module provides the [`Hasher`] struct, which streams file contents in
//! fixed-size chunks so memory use per worker is bounded by the chunk size,
//! not by the size of the largest file. It supports two operations:
//!
//! - [`Hasher::digest`]: a cryptographic digest of the whole file
//! - [`Hasher::contents_equal`]: byte-exact comparison of two files that
//!   stops at the first differing chunk
//!
//! The digest function sits behind the [`ContentDigest`] trait. BLAKE3 and
//! SHA-256 are built in; any other implementation can be plugged in with
//! [`Hasher::with_digest`].
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new().with_chunk_size(128 * 1024);
//! let hash = hasher.digest(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use super::HashError;

/// A 32-byte content digest.
pub type Hash = [u8; 32];

/// Default read chunk size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Incremental state of a digest computation.
pub trait DigestState {
    /// Feed the next chunk of content.
    fn update(&mut self, data: &[u8]);

    /// Consume the state and produce the final digest.
    fn finish(self: Box<Self>) -> Hash;
}

/// A digest function over file contents.
///
/// Implementations must be deterministic: equal byte streams must always
/// produce equal digests.
pub trait ContentDigest: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Start a new digest computation.
    fn start(&self) -> Box<dyn DigestState>;
}

/// Built-in digest functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 (default, fastest)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Create the digest implementation for this algorithm.
    #[must_use]
    pub fn digest(self) -> Arc<dyn ContentDigest> {
        match self {
            Self::Blake3 => Arc::new(Blake3Digest),
            Self::Sha256 => Arc::new(Sha256Digest),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// BLAKE3 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Digest;

impl ContentDigest for Blake3Digest {
    fn name(&self) -> &'static str {
        "blake3"
    }

    fn start(&self) -> Box<dyn DigestState> {
        Box::new(blake3::Hasher::new())
    }
}

impl DigestState for blake3::Hasher {
    fn update(&mut self, data: &[u8]) {
        blake3::Hasher::update(self, data);
    }

    fn finish(self: Box<Self>) -> Hash {
        *self.finalize().as_bytes()
    }
}

/// SHA-256 digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl ContentDigest for Sha256Digest {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn start(&self) -> Box<dyn DigestState> {
        Box::new(sha2::Sha256::new())
    }
}

impl DigestState for sha2::Sha256 {
    fn update(&mut self, data: &[u8]) {
        Digest::update(self, data);
    }

    fn finish(self: Box<Self>) -> Hash {
        (*self).finalize().into()
    }
}

/// Streaming file hasher and comparator.
#[derive(Clone)]
pub struct Hasher {
    digest: Arc<dyn ContentDigest>,
    chunk_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("digest", &self.digest.name())
            .field("chunk_size", &self.chunk_size)
            .field("shutdown_flag", &self.shutdown_flag)
            .finish()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a BLAKE3 hasher with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: HashAlgorithm::Blake3.digest(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            shutdown_flag: None,
        }
    }

    /// Use one of the built-in digest functions.
    #[must_use]
    pub fn with_algorithm(self, algorithm: HashAlgorithm) -> Self {
        self.with_digest(algorithm.digest())
    }

    /// Use a custom digest function.
    #[must_use]
    pub fn with_digest(mut self, digest: Arc<dyn ContentDigest>) -> Self {
        self.digest = digest;
        self
    }

    /// Set the read chunk size in bytes (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the shutdown flag, checked between chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Read chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Name of the digest function in use.
    #[must_use]
    pub fn digest_name(&self) -> &'static str {
        self.digest.name()
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Compute the digest of a file's full contents.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or
    /// [`HashError::Interrupted`] if shutdown is requested mid-file.
    pub fn digest(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.digest_reader(path, file)
    }

    /// Compute the digest of everything `reader` yields.
    ///
    /// `path` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::digest`].
    pub fn digest_reader<R: Read>(&self, path: &Path, mut reader: R) -> Result<Hash, HashError> {
        let mut state = self.digest.start();
        let mut buf = vec![0u8; self.chunk_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted);
            }
            let n = fill_chunk(&mut reader, &mut buf).map_err(|e| HashError::from_io(path, e))?;
            if n == 0 {
                break;
            }
            state.update(&buf[..n]);
            if n < buf.len() {
                break;
            }
        }

        Ok(state.finish())
    }

    /// Compare two files byte for byte.
    ///
    /// Both files are streamed chunk by chunk; the comparison stops at the
    /// first chunk that differs.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] naming whichever file failed to open or read, or
    /// [`HashError::Interrupted`] if shutdown is requested.
    pub fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

        let mut buf_a = vec![0u8; self.chunk_size];
        let mut buf_b = vec![0u8; self.chunk_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted);
            }
            let n_a = fill_chunk(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let n_b = fill_chunk(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

            if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
                return Ok(false);
            }
            if n_a < buf_a.len() {
                return Ok(true);
            }
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Convert a hash to a lowercase hexadecimal string.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Parse a 64-character hexadecimal string into a hash.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    if hex.len() != 64 || !hex.is_ascii() {
        return None;
    }
    let mut hash = [0u8; 32];
    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(hash)
}
