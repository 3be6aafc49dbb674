use dupewalk::duplicates::{DuplicateFinder, DuplicateIndex, FinderConfig};
use dupewalk::scanner::{DirIdentity, EntryKind, FileSource, Listing, MemorySource};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Tree with `breadth` subdirectories per level, `depth` levels deep and
/// three files per directory drawn from four distinct contents.
fn tree(breadth: usize, depth: usize) -> (MemorySource, usize) {
    fn fill(source: MemorySource, dir: PathBuf, breadth: usize, depth: usize, count: &mut usize) -> MemorySource {
        let mut source = source.with_dir(dir.clone());
        for f in 0..3 {
            source = source.with_file(dir.join(format!("f{f}")), format!("blob {}", (*count + f) % 4));
        }
        *count += 3;
        if depth > 0 {
            for b in 0..breadth {
                source = fill(source, dir.join(format!("d{b}")), breadth, depth - 1, count);
            }
        }
        source
    }

    let mut count = 0;
    let source = fill(MemorySource::new(), PathBuf::from("/t"), breadth, depth, &mut count);
    (source, count)
}

fn scan(source: MemorySource, jobs: usize, capacity: usize) -> (DuplicateIndex, dupewalk::duplicates::ScanSummary) {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_jobs(jobs)
            .with_channel_capacity(capacity)
            .with_source(Arc::new(source)),
    )
    .find_duplicates(Path::new("/t"))
    .unwrap()
}

fn normalized(index: &DuplicateIndex) -> Vec<Vec<PathBuf>> {
    let mut groups: Vec<Vec<PathBuf>> = index
        .groups()
        .map(|g| {
            let mut paths: Vec<PathBuf> = g.paths().map(Path::to_path_buf).collect();
            paths.sort();
            paths
        })
        .collect();
    groups.sort();
    groups
}

#[test]
fn test_no_loss_no_duplication() {
    let (source, files) = tree(3, 3);

    let (index, summary) = scan(source, 4, 8);

    assert_eq!(summary.total_files, files);
    let mut all: Vec<PathBuf> = index
        .groups()
        .flat_map(|g| g.paths().map(Path::to_path_buf).collect::<Vec<_>>())
        .collect();
    let before = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), before);
    assert_eq!(index.len(), 4);
}

#[test]
fn test_result_independent_of_jobs_and_capacity() {
    let (source, _) = tree(3, 2);
    let baseline = normalized(&scan(source.clone(), 1, 0).0);

    for (jobs, capacity) in [(2, 0), (4, 1), (8, 1024), (16, 3)] {
        let (index, _) = scan(source.clone(), jobs, capacity);
        assert_eq!(
            normalized(&index),
            baseline,
            "jobs = {}, capacity = {}",
            jobs,
            capacity
        );
    }
}

#[test]
fn test_depth_far_beyond_jobs() {
    let (source, files) = tree(1, 300);

    let (_, summary) = scan(source, 2, 0);

    assert_eq!(summary.total_files, files);
    assert_eq!(summary.tasks.completed, 301);
}

#[test]
fn test_peak_active_never_exceeds_jobs() {
    for jobs in [1, 2, 3] {
        let (source, _) = tree(4, 2);
        let (_, summary) = scan(source, jobs, 2);
        assert!(summary.tasks.peak_active <= jobs);
        assert!(summary.tasks.is_drained());
    }
}

/// Delegating source that raises the shutdown flag after some listings.
struct TrippingSource {
    inner: MemorySource,
    flag: Arc<AtomicBool>,
    trip_after: usize,
    listings: AtomicUsize,
}

impl FileSource for TrippingSource {
    fn read_dir(&self, path: &Path) -> io::Result<Listing> {
        if self.listings.fetch_add(1, Ordering::SeqCst) + 1 >= self.trip_after {
            self.flag.store(true, Ordering::SeqCst);
        }
        self.inner.read_dir(path)
    }

    fn probe_dir(&self, path: &Path) -> io::Result<()> {
        self.inner.probe_dir(path)
    }

    fn kind(&self, path: &Path) -> io::Result<EntryKind> {
        self.inner.kind(path)
    }

    fn identity(&self, path: &Path) -> io::Result<DirIdentity> {
        self.inner.identity(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        self.inner.open(path)
    }
}

#[test]
fn test_shutdown_mid_scan_returns_partial_results() {
    let (inner, files) = tree(4, 3);
    let flag = Arc::new(AtomicBool::new(false));
    let source = TrippingSource {
        inner,
        flag: Arc::clone(&flag),
        trip_after: 3,
        listings: AtomicUsize::new(0),
    };

    let (_, summary) = DuplicateFinder::new(
        FinderConfig::default()
            .with_jobs(2)
            .with_source(Arc::new(source))
            .with_shutdown_flag(flag),
    )
    .find_duplicates(Path::new("/t"))
    .unwrap();

    assert!(summary.interrupted);
    assert!(summary.total_files < files);
    assert!(summary.directories < 85);
    assert!(summary.tasks.is_drained());
}
