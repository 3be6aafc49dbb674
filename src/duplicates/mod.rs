//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Concurrent aggregation of digests into content groups
//! - The frozen duplicate index and its statistics
//! - The finder that runs a complete scan

pub mod aggregator;
pub mod finder;
pub mod groups;

pub use aggregator::Aggregator;
pub use finder::{
    default_jobs, DuplicateFinder, FinderConfig, FinderError, ScanSummary,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use groups::{DuplicateGroup, DuplicateIndex};
