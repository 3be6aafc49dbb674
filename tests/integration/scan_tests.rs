use dupewalk::duplicates::{DuplicateFinder, FinderConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn write(path: PathBuf, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (index, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(index.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.directories, 1);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"content a");
    write(dir.path().join("b.txt"), b"content b");
    write(dir.path().join("c.txt"), b"content c");

    let (index, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(index.duplicates().is_empty());
    assert_eq!(index.len(), 3);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_duplicate_pair_and_unique() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"duplicate");
    write(dir.path().join("b.txt"), b"duplicate");
    write(dir.path().join("c.txt"), b"unique");

    let (index, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let dups = index.duplicates();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].len(), 2);
    assert!(dups[0].contains(&dir.path().join("a.txt")));
    assert!(dups[0].contains(&dir.path().join("b.txt")));
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 9);
}

#[test]
fn test_scan_duplicates_across_levels() {
    let dir = tempdir().unwrap();
    write(dir.path().join("top.bin"), b"shared payload");
    write(dir.path().join("one/mid.bin"), b"shared payload");
    write(dir.path().join("one/two/three/deep.bin"), b"shared payload");
    write(dir.path().join("one/two/other.bin"), b"different");

    let (index, summary) = DuplicateFinder::new(FinderConfig::default().with_jobs(2))
        .find_duplicates(dir.path())
        .unwrap();

    let dups = index.duplicates();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].len(), 3);
    assert_eq!(summary.directories, 4);
    assert_eq!(summary.tasks.completed, 4);
}

#[test]
fn test_scan_empty_files_group_together() {
    let dir = tempdir().unwrap();
    write(dir.path().join("empty1"), b"");
    write(dir.path().join("sub/empty2"), b"");

    let (index, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.reclaimable_space, 0);
    assert_eq!(index.duplicates()[0].size, 0);
}

#[test]
fn test_scan_name_does_not_matter() {
    let dir = tempdir().unwrap();
    write(dir.path().join("same_name.txt"), b"first");
    write(dir.path().join("sub/same_name.txt"), b"second");

    let (_, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_large_file_streams() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..300_000u32).map(|i| (i % 253) as u8).collect();
    write(dir.path().join("big1.bin"), &content);
    write(dir.path().join("big2.bin"), &content);
    let mut altered = content.clone();
    altered[299_999] ^= 0xff;
    write(dir.path().join("big3.bin"), &altered);

    let (index, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.duplicate_groups, 1);
    assert!(!index.duplicates()[0].contains(&dir.path().join("big3.bin")));
    assert_eq!(summary.total_bytes, 900_000);
}

#[test]
fn test_max_depth_limits_scan() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"dup");
    write(dir.path().join("l1/b.txt"), b"dup");
    write(dir.path().join("l1/l2/c.txt"), b"dup");

    let (index, summary) =
        DuplicateFinder::new(FinderConfig::default().with_max_depth(Some(1)))
            .find_duplicates(dir.path())
            .unwrap();

    assert_eq!(summary.total_files, 2);
    assert!(index.group_of(&dir.path().join("l1/l2/c.txt")).is_none());
}
