//! Scan-scoped fingerprints.
//!
//! A [`Fingerprint`] pairs a file's size (always known from the walk) with its
//! content digest, which is computed lazily and at most once per path.
//! The [`DigestCache`] holding those digests belongs to a single scan and is
//! dropped with it; nothing is shared between scans.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{FileEntry, Hash, HashError, Hasher};

/// Cheap discriminator plus the lazily computed digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// File size in bytes
    pub size: u64,
    /// Content digest, once computed
    pub digest: Option<Hash>,
}

/// Write-once map from path to digest, owned by one scan.
#[derive(Debug, Default)]
pub struct DigestCache {
    digests: Mutex<HashMap<PathBuf, Hash>>,
}

impl DigestCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache sized for `capacity` files.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            digests: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Cached digest for a path, if it has been computed.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Hash> {
        self.digests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
    }

    /// Digest of `entry`, computing it with `hasher` on first use.
    ///
    /// The file is read outside the lock. Each path is handed to exactly one
    /// worker by the finder, and a racing second insert would store the same
    /// value, so the first stored digest wins.
    ///
    /// # Errors
    ///
    /// Propagates the [`HashError`] from reading the file. Failures are not
    /// cached.
    pub fn digest_of(&self, entry: &FileEntry, hasher: &Hasher) -> Result<Hash, HashError> {
        if let Some(hash) = self.get(&entry.path) {
            log::trace!("Digest cache hit: {}", entry.path.display());
            return Ok(hash);
        }

        let hash = hasher.digest(&entry.path)?;
        let mut digests = self.digests.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(*digests.entry(entry.path.clone()).or_insert(hash))
    }

    /// Current fingerprint of `entry`.
    #[must_use]
    pub fn fingerprint(&self, entry: &FileEntry) -> Fingerprint {
        Fingerprint {
            size: entry.size,
            digest: self.get(&entry.path),
        }
    }

    /// Number of digests stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.digests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no digest has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
