//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Bounded parallel directory traversal (one task per directory)
//! - Streaming content hashing with BLAKE3
//! - Pluggable filesystem access for real disks and in-memory trees
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`source`]: Filesystem collaborator ([`FileSource`] trait)
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//! - [`walker`]: Single-directory traversal step
//! - [`coordinator`]: Admission control and completion tracking
//!
//! # Example
//!
//! ```no_run
//! use dupewalk::scanner::{Hasher, hash_to_hex};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

pub mod coordinator;
pub mod hasher;
pub mod source;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};

// Re-export main types
pub use coordinator::{Coordinator, CoordinatorError, RunReport, TaskCounts, TaskTracker};
pub use hasher::{hash_to_hex, hex_to_hash, Digest, Hash, Hasher, BUFFER_SIZE};
pub use source::{
    DirIdentity, DirItem, EntryError, EntryKind, FileSource, Listing, MemorySource, OsFileSource,
};
pub use walker::{DirTask, WalkCounts, Walker};

/// A successfully digested file on its way to the aggregator.
///
/// Produced exactly once per readable regular file and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path of the file as discovered during traversal
    pub path: PathBuf,
    /// BLAKE3 hash of the complete file content
    pub hash: Hash,
    /// Number of bytes digested
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, hash: Hash, size: u64) -> Self {
        Self { path, hash, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Directories reached through links are visited once per identity.
    pub follow_symlinks: bool,

    /// Maximum directory depth below the root (root = 0).
    /// Subdirectories deeper than this are not entered.
    pub max_depth: Option<usize>,
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    #[must_use]
    pub fn new(follow_symlinks: bool, max_depth: Option<usize>) -> Self {
        Self {
            follow_symlinks,
            max_depth,
        }
    }
}

/// Recoverable errors raised while walking the tree.
///
/// None of them aborts the scan: the affected subtree, entry or file is
/// skipped, the error is logged, and traversal continues.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A directory could not be listed. Its subtree is treated as empty.
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        /// Directory that could not be listed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A listed entry could not be inspected. Its siblings are unaffected.
    #[error("Failed to read directory entry {path}: {source}")]
    EntryRead {
        /// Entry that could not be inspected
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A file could not be fully read for digesting. It joins no group.
    #[error("Failed to read file: {source}")]
    FileRead {
        /// File that could not be digested
        path: PathBuf,
        /// The hashing failure
        #[source]
        source: HashError,
    },
}

impl ScanError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::DirectoryRead { path, .. }
            | Self::EntryRead { path, .. }
            | Self::FileRead { path, .. } => path,
        }
    }

    /// Whether this error concerns a directory listing.
    #[must_use]
    pub fn is_directory_error(&self) -> bool {
        matches!(self, Self::DirectoryRead { .. })
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened.
    #[error("Cannot open {path}: {source}")]
    Open {
        /// File that could not be opened
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Reading failed partway through the content. No digest is produced.
    #[error("Read failed for {path}: {source}")]
    ReadFailure {
        /// File whose content could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::ReadFailure { path, .. } => path,
        }
    }
}

/// The aggregator side of the delivery channel hung up.
#[derive(thiserror::Error, Debug)]
#[error("Aggregator stopped accepting entries; dropped {0}")]
pub struct DeliveryError(pub PathBuf);
