//! Application configuration management.
//!
//! Settings are layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config FILE`, or `config.toml` in the platform config directory)
//! 3. Environment variables prefixed with `DUPEWALK_` (e.g. `DUPEWALK_JOBS=8`)
//! 4. Command-line flags

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::{default_jobs, FinderConfig, DEFAULT_CHANNEL_CAPACITY};
use crate::scanner::WalkerConfig;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPEWALK_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of directories processed concurrently.
    pub jobs: usize,
    /// Delivery channel capacity (0 = rendezvous).
    pub channel_capacity: usize,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Maximum directory depth below the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            follow_symlinks: false,
            max_depth: None,
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Load defaults, the configuration file and the environment.
    ///
    /// An explicitly given file must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// Fails if the explicit file is missing or any layer holds invalid
    /// values.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(explicit)?
            .extract()
            .context("Invalid configuration")?;
        Ok(config.normalized())
    }

    /// Layered provider using [`ENV_PREFIX`] for the environment.
    ///
    /// # Errors
    ///
    /// Fails if the explicit file is missing.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        Self::figment_with_prefix(explicit, ENV_PREFIX)
    }

    /// Layered provider with a custom environment prefix.
    ///
    /// # Errors
    ///
    /// Fails if the explicit file is missing.
    pub fn figment_with_prefix(explicit: Option<&Path>, env_prefix: &str) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("Configuration file not found: {}", path.display());
                }
                log::debug!("Loading configuration from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    log::trace!("Looking for configuration at {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(env_prefix)))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "dupewalk", "dupewalk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Override settings with flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(jobs) = cli.jobs {
            self.jobs = jobs;
        }
        if let Some(capacity) = cli.channel_capacity {
            self.channel_capacity = capacity;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if cli.max_depth.is_some() {
            self.max_depth = cli.max_depth;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        *self = self.clone().normalized();
    }

    /// Build the finder configuration for a scan.
    #[must_use]
    pub fn finder_config(&self, shutdown_flag: Arc<AtomicBool>) -> FinderConfig {
        FinderConfig::default()
            .with_jobs(self.jobs)
            .with_channel_capacity(self.channel_capacity)
            .with_walker_config(WalkerConfig::new(self.follow_symlinks, self.max_depth))
            .with_shutdown_flag(shutdown_flag)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Fails if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    fn normalized(mut self) -> Self {
        self.jobs = self.jobs.max(1);
        self
    }
}
