//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! This module provides the `Hasher` struct for computing BLAKE3 hashes
//! of file contents using memory-efficient streaming. Content is fed to
//! the hash state in fixed-size chunks, so peak memory per file is one
//! buffer regardless of file size.

use std::io::{self, Read};
use std::path::Path;

use super::source::{FileSource, OsFileSource};
use super::HashError;

/// A 32-byte BLAKE3 content hash.
pub type Hash = [u8; 32];

/// Default read buffer size (64 KiB).
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Result of digesting one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digest {
    /// BLAKE3 hash of the complete content
    pub hash: Hash,
    /// Number of bytes consumed
    pub bytes: u64,
}

/// Streaming BLAKE3 hasher.
///
/// Stateless between calls; cheap to clone and share across threads.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
        }
    }

    /// Use a custom read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Configured read buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Hash a file on the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Open`] if the file cannot be opened and
    /// [`HashError::ReadFailure`] if reading fails partway.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupewalk::scanner::Hasher;
    /// use std::path::Path;
    ///
    /// let hash = Hasher::new().full_hash(Path::new("photo.jpg")).unwrap();
    /// assert_eq!(hash.len(), 32);
    /// ```
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        self.hash_file(&OsFileSource, path).map(|digest| digest.hash)
    }

    /// Hash a file obtained from an arbitrary [`FileSource`].
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::full_hash`].
    pub fn hash_file(&self, source: &dyn FileSource, path: &Path) -> Result<Digest, HashError> {
        let reader = source.open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.hash_reader(reader, path)
    }

    /// Hash everything a reader yields until EOF.
    ///
    /// `path` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::ReadFailure`] if the reader fails before EOF.
    pub fn hash_reader<R: Read>(&self, mut reader: R, path: &Path) -> Result<Digest, HashError> {
        let mut state = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut bytes = 0u64;

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(HashError::ReadFailure {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };
            state.update(&buffer[..read]);
            bytes += read as u64;
        }

        log::trace!("Hashed {} ({} bytes)", path.display(), bytes);
        Ok(Digest {
            hash: *state.finalize().as_bytes(),
            bytes,
        })
    }
}

/// Format a hash as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Parse a 64-character hexadecimal string back into a hash.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
