//! Duplicate finder: wires the traversal pipeline together.
//!
//! # Overview
//!
//! [`DuplicateFinder::find_duplicates`] validates the root directory, then
//! runs the [`Walker`] under a [`Coordinator`] with an [`Aggregator`]
//! consuming the delivered entries. When traversal completes it takes the
//! final snapshot and computes a [`ScanSummary`].
//!
//! # Example
//!
//! ```no_run
//! use dupewalk::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default().with_jobs(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let (index, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("Found {} duplicate groups", index.duplicates().len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::aggregator::Aggregator;
use super::groups::DuplicateIndex;
use crate::scanner::{
    Coordinator, CoordinatorError, EntryKind, FileSource, OsFileSource, ScanError, TaskCounts,
    Walker, WalkerConfig,
};

/// Default delivery channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Number of traversal workers used when none is configured.
///
/// Falls back to 4 if the available parallelism cannot be determined.
#[must_use]
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum concurrently active traversal tasks (at least 1).
    pub jobs: usize,
    /// Delivery channel capacity (0 = rendezvous).
    pub channel_capacity: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Filesystem to scan.
    pub source: Arc<dyn FileSource>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("jobs", &self.jobs)
            .field("channel_capacity", &self.channel_capacity)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field("source", &"<file source>")
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            source: Arc::new(OsFileSource),
        }
    }
}

impl FinderConfig {
    /// Set the number of traversal workers (minimum 1).
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set the delivery channel capacity.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Follow symbolic links during traversal.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.walker_config.follow_symlinks = follow;
        self
    }

    /// Limit traversal depth below the root.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.walker_config.max_depth = max_depth;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Scan a different filesystem.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn FileSource>) -> Self {
        self.source = source;
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Files successfully digested
    pub total_files: usize,
    /// Bytes digested
    pub total_bytes: u64,
    /// Directories successfully listed
    pub directories: usize,
    /// Digests shared by more than one file
    pub duplicate_groups: usize,
    /// Redundant copies (files beyond the first in each group)
    pub duplicate_files: usize,
    /// Space held by redundant copies
    pub reclaimable_space: u64,
    /// Traversal task counters
    pub tasks: TaskCounts,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Recoverable errors encountered during the scan
    pub errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total digested size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_bytes).to_string()
    }

    /// Number of recoverable errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Errors that prevent a scan from producing a report.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root path cannot be accessed.
    #[error("Cannot access {path}: {source}")]
    RootPath {
        /// The root path given
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The traversal machinery failed.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

/// Duplicate finder that runs the concurrent traversal pipeline.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all files below `root` that share content.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The root does not exist or cannot be listed
    /// - The root is not a directory
    /// - The worker pool or aggregator thread fails
    ///
    /// Unreadable subdirectories and files are not errors; they are
    /// counted in [`ScanSummary::errors`].
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(DuplicateIndex, ScanSummary), FinderError> {
        let start_time = Instant::now();
        self.validate_root(root)?;

        log::info!(
            "Starting duplicate scan of {} ({} jobs)",
            root.display(),
            self.config.jobs
        );

        let mut walker = Walker::new(
            Arc::clone(&self.config.source),
            self.config.walker_config.clone(),
        );
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let coordinator = Coordinator::new(self.config.jobs, self.config.channel_capacity)?;
        let aggregator = Arc::new(Aggregator::new());
        let report = {
            let aggregator = Arc::clone(&aggregator);
            coordinator.run(&walker, root, move |receiver| aggregator.consume(receiver))?
        };

        let index = aggregator.snapshot();
        let counts = walker.counts();
        // A flag raised after the last entry was handled leaves the result complete
        let interrupted = report.tasks.rejected > 0 || walker.was_cut_short();
        if interrupted {
            log::warn!("Scan interrupted; results are partial");
        }

        let summary = ScanSummary {
            total_files: index.total_files(),
            total_bytes: counts.bytes,
            directories: counts.directories,
            duplicate_groups: index.duplicates().len(),
            duplicate_files: index.duplicate_file_count(),
            reclaimable_space: index.reclaimable_space(),
            tasks: report.tasks,
            scan_duration: start_time.elapsed(),
            interrupted,
            errors: walker.take_errors(),
        };
        debug_assert_eq!(report.consumed, summary.total_files);

        log::info!(
            "Scan complete: {} files, {} duplicate groups, {} reclaimable",
            summary.total_files,
            summary.duplicate_groups,
            summary.reclaimable_display()
        );
        Ok((index, summary))
    }

    /// Check that the root is a listable directory before any work starts.
    fn validate_root(&self, root: &Path) -> Result<(), FinderError> {
        let source = self.config.source.as_ref();
        let kind = source.kind(root).map_err(|e| FinderError::RootPath {
            path: root.to_path_buf(),
            source: e,
        })?;
        if kind != EntryKind::Directory {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }
        source.probe_dir(root).map_err(|e| FinderError::RootPath {
            path: root.to_path_buf(),
            source: e,
        })
    }
}
