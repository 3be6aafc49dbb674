//! Single-directory traversal step.
//!
//! # Overview
//!
//! The [`Walker`] does not recurse by itself. Each call to [`Walker::visit`]
//! processes exactly one directory: it reads the complete listing, hands
//! every subdirectory back to the caller through a spawn callback, digests
//! every regular file and delivers the resulting [`FileEntry`] over a
//! channel. The [`Coordinator`](super::Coordinator) decides when and where
//! the spawned tasks run.
//!
//! # Features
//!
//! - Directory listing is fully read before any file is opened
//! - Recoverable errors are logged and collected, never propagated
//! - Optional symlink following with visited-directory tracking
//! - Optional depth limit
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```
//! use dupewalk::scanner::{MemorySource, Walker, WalkerConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let source = MemorySource::new()
//!     .with_file("/scan/a.txt", b"same")
//!     .with_file("/scan/sub/b.txt", b"same");
//! let walker = Walker::new(Arc::new(source), WalkerConfig::default());
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let mut pending = vec![walker.root_task(Path::new("/scan"))];
//! while let Some(task) = pending.pop() {
//!     walker.visit(task, &tx, |child| pending.push(child)).unwrap();
//! }
//! drop(tx);
//!
//! assert_eq!(rx.iter().count(), 2);
//! ```

use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::Sender;
use dashmap::DashSet;

use super::hasher::Hasher;
use super::source::{DirIdentity, DirItem, EntryKind, FileSource};
use super::{DeliveryError, FileEntry, ScanError, WalkerConfig};

/// One unit of traversal work: a directory to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTask {
    /// Directory to list
    pub path: PathBuf,
    /// Distance from the scan root (root = 0)
    pub depth: usize,
}

impl DirTask {
    /// Task for the scan root.
    #[must_use]
    pub fn root(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            depth: 0,
        }
    }

    /// Task for a subdirectory of this task's directory.
    #[must_use]
    pub fn child(&self, path: PathBuf) -> Self {
        Self {
            path,
            depth: self.depth + 1,
        }
    }
}

/// Snapshot of walker statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkCounts {
    /// Directories successfully listed
    pub directories: usize,
    /// Files digested and delivered
    pub files: usize,
    /// Total bytes digested
    pub bytes: u64,
    /// Entries skipped (symlinks, special files, depth limit, revisits)
    pub skipped: usize,
    /// Recoverable errors recorded
    pub errors: usize,
}

/// Per-directory traversal step shared by all traversal tasks.
pub struct Walker {
    source: Arc<dyn FileSource>,
    hasher: Hasher,
    config: WalkerConfig,
    /// Directory identities already scheduled (only used when following links)
    visited: DashSet<DirIdentity>,
    directories: AtomicUsize,
    files: AtomicUsize,
    bytes: AtomicU64,
    skipped: AtomicUsize,
    errors: Mutex<Vec<ScanError>>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Set when shutdown left a directory or entry unprocessed
    cut_short: AtomicBool,
}

impl fmt::Debug for Walker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Walker")
            .field("hasher", &self.hasher)
            .field("config", &self.config)
            .field("visited", &self.visited.len())
            .field("counts", &self.counts())
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .field("cut_short", &self.was_cut_short())
            .finish()
    }
}

impl Walker {
    /// Create a walker reading from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn FileSource>, config: WalkerConfig) -> Self {
        Self {
            source,
            hasher: Hasher::new(),
            config,
            visited: DashSet::new(),
            directories: AtomicUsize::new(0),
            files: AtomicUsize::new(0),
            bytes: AtomicU64::new(0),
            skipped: AtomicUsize::new(0),
            errors: Mutex::new(Vec::new()),
            shutdown_flag: None,
            cut_short: AtomicBool::new(false),
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, [`Walker::visit`] does no further
    /// work and returns at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Whether shutdown skipped work that was still pending.
    ///
    /// A flag raised after the last entry was handled leaves this `false`.
    #[must_use]
    pub fn was_cut_short(&self) -> bool {
        self.cut_short.load(Ordering::SeqCst)
    }

    /// Create the task for the scan root.
    ///
    /// When following symlinks the root is registered as visited, so a link
    /// pointing back at it is not entered again.
    pub fn root_task(&self, root: &Path) -> DirTask {
        if self.config.follow_symlinks {
            if let Ok(identity) = self.source.identity(root) {
                self.visited.insert(identity);
            }
        }
        DirTask::root(root)
    }

    /// Process one directory.
    ///
    /// Subdirectories are handed to `spawn` as they are found; enumeration
    /// continues without waiting for them. Files are digested and sent on
    /// `sink`. The call returns only after every entry it produced was
    /// accepted by the channel.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the receiving side of `sink` is gone.
    /// Unreadable directories, entries and files are not errors here; they
    /// are logged and recorded (see [`Walker::take_errors`]).
    pub fn visit<F>(
        &self,
        task: DirTask,
        sink: &Sender<FileEntry>,
        mut spawn: F,
    ) -> Result<(), DeliveryError>
    where
        F: FnMut(DirTask),
    {
        if self.is_shutdown_requested() {
            log::debug!("Walker: Shutdown requested, skipping {}", task.path.display());
            self.cut_short.store(true, Ordering::SeqCst);
            return Ok(());
        }

        let items = match self.source.read_dir(&task.path) {
            Ok(items) => items,
            Err(source) => {
                self.record(ScanError::DirectoryRead {
                    path: task.path,
                    source,
                });
                return Ok(());
            }
        };
        self.directories.fetch_add(1, Ordering::Relaxed);
        log::trace!("Listed {} ({} entries)", task.path.display(), items.len());

        for item in items {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping in {}", task.path.display());
                self.cut_short.store(true, Ordering::SeqCst);
                break;
            }

            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    self.record(ScanError::EntryRead {
                        path: e.path,
                        source: e.source,
                    });
                    continue;
                }
            };

            match self.classify(&item) {
                Some(EntryKind::Directory) => {
                    if self.admit_subdir(&task, &item.path) {
                        spawn(task.child(item.path));
                    }
                }
                Some(EntryKind::File) => {
                    if let Some(entry) = self.digest_file(item.path) {
                        sink.send(entry)
                            .map_err(|e| DeliveryError(e.into_inner().path))?;
                    }
                }
                _ => {
                    self.skipped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        Ok(())
    }

    /// Decide what an entry is for traversal purposes.
    ///
    /// Returns `None` for entries that are skipped.
    fn classify(&self, item: &DirItem) -> Option<EntryKind> {
        match item.kind {
            EntryKind::Directory | EntryKind::File => Some(item.kind),
            EntryKind::Symlink if self.config.follow_symlinks => {
                match self.source.kind(&item.path) {
                    Ok(kind @ (EntryKind::Directory | EntryKind::File)) => Some(kind),
                    Ok(_) => {
                        log::trace!("Skipping link to special file: {}", item.path.display());
                        None
                    }
                    Err(e) => {
                        log::debug!("Skipping broken symlink {}: {}", item.path.display(), e);
                        None
                    }
                }
            }
            EntryKind::Symlink => {
                log::trace!("Skipping symlink: {}", item.path.display());
                None
            }
            EntryKind::Other => {
                log::trace!("Skipping special file: {}", item.path.display());
                None
            }
        }
    }

    /// Check the depth limit and, when following links, the visited set.
    fn admit_subdir(&self, parent: &DirTask, path: &Path) -> bool {
        if let Some(max) = self.config.max_depth {
            if parent.depth >= max {
                log::trace!("Depth limit {} reached at {}", max, path.display());
                self.skipped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
        }

        if self.config.follow_symlinks {
            // Identity failures fall through; the listing reports them.
            if let Ok(identity) = self.source.identity(path) {
                if !self.visited.insert(identity) {
                    log::debug!("Already visited, not descending: {}", path.display());
                    self.skipped.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
            }
        }

        true
    }

    fn digest_file(&self, path: PathBuf) -> Option<FileEntry> {
        match self.hasher.hash_file(self.source.as_ref(), &path) {
            Ok(digest) => {
                self.files.fetch_add(1, Ordering::Relaxed);
                self.bytes.fetch_add(digest.bytes, Ordering::Relaxed);
                Some(FileEntry::new(path, digest.hash, digest.bytes))
            }
            Err(source) => {
                self.record(ScanError::FileRead { path, source });
                None
            }
        }
    }

    /// Log a recoverable error and keep it for the summary.
    fn record(&self, error: ScanError) {
        log::warn!("{}", error);
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }

    /// Drain the recorded errors.
    pub fn take_errors(&self) -> Vec<ScanError> {
        mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Current statistics.
    #[must_use]
    pub fn counts(&self) -> WalkCounts {
        WalkCounts {
            directories: self.directories.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errors: self
                .errors
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        }
    }
}
