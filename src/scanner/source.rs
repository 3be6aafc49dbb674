//! Filesystem access for the scanner.
//!
//! Traversal never touches `std::fs` directly; it goes through the
//! [`FileSource`] trait. [`OsFileSource`] is the real filesystem and
//! [`MemorySource`] is an in-memory tree with injectable failures
//! (unreadable directories, entries that vanish while listed, files that
//! fail mid-read, symlinks).
//!
//! # Example
//!
//! ```
//! use dupewalk::scanner::{FileSource, MemorySource, EntryKind};
//! use std::path::Path;
//!
//! let source = MemorySource::new()
//!     .with_file("/scan/a.txt", b"hello")
//!     .with_dir("/scan/empty");
//!
//! let items = source.read_dir(Path::new("/scan")).unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(items[0].as_ref().unwrap().kind, EntryKind::File);
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, FileType};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// What a directory entry is, as far as traversal is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory to descend into
    Directory,
    /// A regular file to digest
    File,
    /// A symbolic link (not yet resolved)
    Symlink,
    /// Devices, pipes, sockets and anything else
    Other,
}

impl From<FileType> for EntryKind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    /// Full path of the entry (listing path joined with the entry name)
    pub path: PathBuf,
    /// Entry kind without following symlinks
    pub kind: EntryKind,
}

/// A listed entry that could not be inspected.
///
/// Only the entry itself is lost; the rest of the listing is still valid.
#[derive(thiserror::Error, Debug)]
#[error("{path}: {source}")]
pub struct EntryError {
    /// Path of the entry, or of the directory when the name is unknown
    pub path: PathBuf,
    /// The underlying I/O error
    #[source]
    pub source: io::Error,
}

/// Outcome of listing one directory, one element per entry.
pub type Listing = Vec<Result<DirItem, EntryError>>;

/// Identity of a directory independent of the path used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirIdentity {
    /// Device and inode number (Unix)
    Inode {
        /// Device id
        device: u64,
        /// Inode number
        inode: u64,
    },
    /// Fully resolved path (platforms without inode numbers)
    Path(PathBuf),
}

/// Filesystem collaborator used by the walker and hasher.
pub trait FileSource: Send + Sync {
    /// List the direct entries of a directory.
    ///
    /// The listing is read completely before returning, so no directory
    /// handle stays open while entries are processed. The outer error means
    /// the directory itself could not be opened; a failing entry is
    /// reported in place and does not affect its siblings.
    fn read_dir(&self, path: &Path) -> io::Result<Listing>;

    /// Check that a directory can be listed without reading it.
    fn probe_dir(&self, path: &Path) -> io::Result<()> {
        self.read_dir(path).map(|_| ())
    }

    /// Kind of the entry at `path`, following symlinks.
    fn kind(&self, path: &Path) -> io::Result<EntryKind>;

    /// Identity of the directory at `path`, following symlinks.
    fn identity(&self, path: &Path) -> io::Result<DirIdentity>;

    /// Open a file for streaming reads.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSource;

impl FileSource for OsFileSource {
    fn read_dir(&self, path: &Path) -> io::Result<Listing> {
        let mut items: Listing = fs::read_dir(path)?
            .map(|entry| {
                let entry = entry.map_err(|source| EntryError {
                    path: path.to_path_buf(),
                    source,
                })?;
                match entry.file_type() {
                    Ok(file_type) => Ok(DirItem {
                        path: entry.path(),
                        kind: EntryKind::from(file_type),
                    }),
                    Err(source) => Err(EntryError {
                        path: entry.path(),
                        source,
                    }),
                }
            })
            .collect();
        // Sort children for deterministic task order
        items.sort_by(|a, b| listed_path(a).cmp(listed_path(b)));
        Ok(items)
    }

    fn probe_dir(&self, path: &Path) -> io::Result<()> {
        fs::read_dir(path).map(drop)
    }

    fn kind(&self, path: &Path) -> io::Result<EntryKind> {
        fs::metadata(path).map(|m| EntryKind::from(m.file_type()))
    }

    #[cfg(unix)]
    fn identity(&self, path: &Path) -> io::Result<DirIdentity> {
        use std::os::unix::fs::MetadataExt;

        let metadata = fs::metadata(path)?;
        Ok(DirIdentity::Inode {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn identity(&self, path: &Path) -> io::Result<DirIdentity> {
        fs::canonicalize(path).map(DirIdentity::Path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }
}

fn listed_path(item: &Result<DirItem, EntryError>) -> &Path {
    match item {
        Ok(item) => &item.path,
        Err(e) => &e.path,
    }
}

/// Symlink resolution gives up after this many hops (matches Linux ELOOP).
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum MemoryNode {
    Dir { readable: bool },
    File { content: Vec<u8>, fail_after: Option<usize> },
    Symlink { target: PathBuf },
    /// Listed by its parent but gone when inspected
    Vanished,
}

/// In-memory directory tree.
///
/// Parent directories are created implicitly. Listing order is the
/// lexicographic order of paths.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    nodes: BTreeMap<PathBuf, MemoryNode>,
}

impl MemorySource {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a readable directory.
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes
            .entry(path)
            .or_insert(MemoryNode::Dir { readable: true });
        self
    }

    /// Add a directory whose listing fails with `PermissionDenied`.
    #[must_use]
    pub fn with_unreadable_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes.insert(path, MemoryNode::Dir { readable: false });
        self
    }

    /// Add a regular file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) -> Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes.insert(
            path,
            MemoryNode::File {
                content: content.as_ref().to_vec(),
                fail_after: None,
            },
        );
        self
    }

    /// Add a file whose reads fail once `fail_after` bytes were delivered.
    ///
    /// If `fail_after` exceeds the content length the failure happens at
    /// end of file instead, so the file never reads successfully.
    #[must_use]
    pub fn with_failing_file(
        mut self,
        path: impl Into<PathBuf>,
        content: impl AsRef<[u8]>,
        fail_after: usize,
    ) -> Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes.insert(
            path,
            MemoryNode::File {
                content: content.as_ref().to_vec(),
                fail_after: Some(fail_after),
            },
        );
        self
    }

    /// Add a symbolic link pointing at an absolute `target`.
    #[must_use]
    pub fn with_symlink(mut self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes.insert(
            path,
            MemoryNode::Symlink {
                target: target.into(),
            },
        );
        self
    }

    /// Add an entry that shows up in its parent's listing as a failure.
    #[must_use]
    pub fn with_vanished_entry(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_parents(&path);
        self.nodes.insert(path, MemoryNode::Vanished);
        self
    }

    /// Number of nodes (directories, files and links) in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(MemoryNode::Dir { readable: true });
        }
    }

    /// Resolve every symlink along `path`.
    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::new();
        for component in path.components() {
            resolved.push(component);
            let mut hops = 0;
            while let Some(MemoryNode::Symlink { target }) = self.nodes.get(&resolved) {
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(io::Error::other(format!(
                        "too many levels of symbolic links: {}",
                        path.display()
                    )));
                }
                resolved = target.clone();
            }
        }
        Ok(resolved)
    }

    fn lookup(&self, path: &Path) -> io::Result<(PathBuf, &MemoryNode)> {
        let resolved = self.resolve(path)?;
        match self.nodes.get(&resolved) {
            Some(MemoryNode::Vanished) | None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file or directory: {}", path.display()),
            )),
            Some(node) => Ok((resolved, node)),
        }
    }
}

impl MemoryNode {
    fn kind(&self) -> io::Result<EntryKind> {
        match self {
            Self::Dir { .. } => Ok(EntryKind::Directory),
            Self::File { .. } => Ok(EntryKind::File),
            Self::Symlink { .. } => Ok(EntryKind::Symlink),
            Self::Vanished => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "entry removed while listing",
            )),
        }
    }
}

impl FileSource for MemorySource {
    fn read_dir(&self, path: &Path) -> io::Result<Listing> {
        let (resolved, node) = self.lookup(path)?;
        match node {
            MemoryNode::Dir { readable: true } => {}
            MemoryNode::Dir { readable: false } => {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("permission denied: {}", path.display()),
                ))
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path.display()),
                ))
            }
        }

        Ok(self
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(resolved.as_path()))
            .filter_map(|(child, node)| {
                let path = path.join(child.file_name()?);
                Some(match node.kind() {
                    Ok(kind) => Ok(DirItem { path, kind }),
                    Err(source) => Err(EntryError { path, source }),
                })
            })
            .collect())
    }

    fn kind(&self, path: &Path) -> io::Result<EntryKind> {
        self.lookup(path)?.1.kind()
    }

    fn identity(&self, path: &Path) -> io::Result<DirIdentity> {
        self.lookup(path)
            .map(|(resolved, _)| DirIdentity::Path(resolved))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        match self.lookup(path)? {
            (_, MemoryNode::File {
                content,
                fail_after,
            }) => Ok(Box::new(MemoryReader {
                content: content.clone(),
                position: 0,
                fail_after: *fail_after,
            })),
            _ => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("not a regular file: {}", path.display()),
            )),
        }
    }
}

struct MemoryReader {
    content: Vec<u8>,
    position: usize,
    fail_after: Option<usize>,
}

impl Read for MemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = self
            .fail_after
            .map_or(self.content.len(), |n| n.min(self.content.len()));
        if self.position >= limit {
            return match self.fail_after {
                Some(_) => Err(io::Error::other("simulated I/O failure")),
                None => Ok(0),
            };
        }
        let n = buf.len().min(limit - self.position);
        buf[..n].copy_from_slice(&self.content[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}
