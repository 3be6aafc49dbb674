//! Content groups and the frozen duplicate index.
//!
//! # Overview
//!
//! A [`DuplicateGroup`] collects every file whose content hashes to the same
//! BLAKE3 digest. The first file to arrive becomes the group's
//! representative; later arrivals are appended to `members`. A group with
//! no members is a unique file.
//!
//! A [`DuplicateIndex`] is the read-only result of a scan: one group per
//! distinct digest.
//!
//! # Example
//!
//! ```
//! use dupewalk::duplicates::{DuplicateGroup, DuplicateIndex};
//! use std::path::PathBuf;
//!
//! let mut group = DuplicateGroup::new([1u8; 32], 1024, PathBuf::from("/a.txt"));
//! group.push(PathBuf::from("/b.txt"));
//! group.push(PathBuf::from("/c.txt"));
//!
//! assert!(group.is_duplicate());
//! assert_eq!(group.wasted_space(), 2048);
//!
//! let index: DuplicateIndex = vec![group].into_iter().collect();
//! assert_eq!(index.duplicates().len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{hash_to_hex, Hash};

/// Files sharing one content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content (32 bytes)
    pub hash: Hash,
    /// Content size in bytes (identical for every file in the group)
    pub size: u64,
    /// First file seen with this content
    pub representative: PathBuf,
    /// Every later file with this content, in arrival order
    pub members: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Start a group with its representative.
    #[must_use]
    pub fn new(hash: Hash, size: u64, representative: PathBuf) -> Self {
        Self {
            hash,
            size,
            representative,
            members: Vec::new(),
        }
    }

    /// Append a file with the same content.
    pub fn push(&mut self, path: PathBuf) {
        self.members.push(path);
    }

    /// Number of files in this group, including the representative.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len() + 1
    }

    /// Always `false`: a group has at least its representative.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether more than one file has this content.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        !self.members.is_empty()
    }

    /// Number of redundant copies.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len()
    }

    /// Space that would be freed by keeping only one copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        let copies = u64::try_from(self.members.len()).unwrap_or(u64::MAX);
        self.size.saturating_mul(copies)
    }

    /// Get the hash as a hex string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// All paths, representative first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.representative.as_path())
            .chain(self.members.iter().map(PathBuf::as_path))
    }

    /// Whether `path` belongs to this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths().any(|p| p == path)
    }
}

/// Read-only snapshot of all groups, keyed by digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIndex {
    groups: HashMap<Hash, DuplicateGroup>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group for a digest.
    #[must_use]
    pub fn get(&self, hash: &Hash) -> Option<&DuplicateGroup> {
        self.groups.get(hash)
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no file was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over all groups in unspecified order.
    pub fn groups(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.values()
    }

    /// Total number of indexed files.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.groups.values().map(DuplicateGroup::len).sum()
    }

    /// Groups with more than one file, sorted by representative path.
    #[must_use]
    pub fn duplicates(&self) -> Vec<&DuplicateGroup> {
        let mut groups: Vec<_> = self
            .groups
            .values()
            .filter(|g| g.is_duplicate())
            .collect();
        groups.sort_by(|a, b| a.representative.cmp(&b.representative));
        groups
    }

    /// Number of redundant copies across all groups.
    #[must_use]
    pub fn duplicate_file_count(&self) -> usize {
        self.groups.values().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Space held by redundant copies.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.groups
            .values()
            .map(DuplicateGroup::wasted_space)
            .fold(0, u64::saturating_add)
    }

    /// Group containing `path`, if it was indexed.
    #[must_use]
    pub fn group_of(&self, path: &Path) -> Option<&DuplicateGroup> {
        self.groups.values().find(|g| g.contains(path))
    }
}

impl FromIterator<DuplicateGroup> for DuplicateIndex {
    fn from_iter<I: IntoIterator<Item = DuplicateGroup>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().map(|g| (g.hash, g)).collect(),
        }
    }
}
