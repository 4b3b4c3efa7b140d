//! Persisted defaults for the command-line tool.
//!
//! Values are layered with `figment`, lowest priority first:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. a TOML file: `--config PATH`, or `config.toml` in the platform
//!    configuration directory (e.g. `~/.config/dupefind/` on Linux)
//! 3. `DUPEFIND_*` environment variables (`DUPEFIND_THREADS=4`,
//!    `DUPEFIND_HASH=sha256`, ...)
//! 4. command-line flags ([`Config::apply_scan_args`])
//!
//! The library never reads any of this; it only sees the resulting
//! [`FinderConfig`].
//!
//! ```toml
//! output = "text"
//! follow_file_symlinks = true
//! skip_hidden = false
//! threads = 4
//! chunk_size = 65536
//! hash = "blake3"
//! ignore = ["*.tmp", ".git/"]
//! progress = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{OutputFormat, ScanArgs};
use crate::duplicates::{default_concurrency, FinderConfig};
use crate::scanner::{HashAlgorithm, WalkerConfig, DEFAULT_CHUNK_SIZE};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPEFIND_";

/// Effective scan settings for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Report format.
    pub output: OutputFormat,
    /// Report symbolic links to files.
    pub follow_file_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Worker thread bound; unset means all available CPUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Read buffer size in bytes.
    pub chunk_size: usize,
    /// Content digest.
    pub hash: HashAlgorithm,
    /// Minimum file size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Maximum file size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Gitignore-style patterns to skip.
    pub ignore: Vec<String>,
    /// Show progress bars for text output.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputFormat::Text,
            follow_file_symlinks: true,
            skip_hidden: false,
            threads: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash: HashAlgorithm::Blake3,
            min_size: None,
            max_size: None,
            ignore: Vec::new(),
            progress: true,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// An explicit `path` must exist. The platform default file is optional.
    ///
    /// # Errors
    ///
    /// Fails if an explicit file is missing, or if any layer holds a value of
    /// the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    anyhow::bail!("Configuration file not found: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => Self::default_path(),
        };
        Self::from_figment(Self::figment(file.as_deref()))
    }

    /// Build the provider stack without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            log::debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extract a configuration from a provider stack.
    ///
    /// # Errors
    ///
    /// Fails if a provider holds a value of the wrong type.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().context("Invalid configuration")?;
        if config.chunk_size == 0 {
            anyhow::bail!("Invalid configuration: chunk_size must be at least 1");
        }
        Ok(config)
    }

    /// Platform default configuration file, if a home directory is known.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupefind").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Layer command-line flags over this configuration.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) {
        if let Some(output) = args.output {
            self.output = output;
        }
        if args.no_follow_symlinks {
            self.follow_file_symlinks = false;
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        }
        if args.threads.is_some() {
            self.threads = args.threads;
        }
        if let Some(chunk_size) = args.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(hash) = args.hash {
            self.hash = hash;
        }
        if args.min_size.is_some() {
            self.min_size = args.min_size;
        }
        if args.max_size.is_some() {
            self.max_size = args.max_size;
        }
        self.ignore.extend(args.ignore_patterns.iter().cloned());
        if args.no_progress {
            self.progress = false;
        }
    }

    /// Finder options described by this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        let walker_config = WalkerConfig::default()
            .with_follow_file_symlinks(self.follow_file_symlinks)
            .with_skip_hidden(self.skip_hidden)
            .with_size_range(self.min_size, self.max_size)
            .with_ignore_patterns(self.ignore.clone());

        FinderConfig::default()
            .with_walker_config(walker_config)
            .with_max_concurrency(self.threads.unwrap_or_else(default_concurrency))
            .with_chunk_size(self.chunk_size)
            .with_hash_algorithm(self.hash)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
