use dupewalk::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupewalk::scanner::{HashError, MemorySource, ScanError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn finder(source: MemorySource) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_jobs(4)
            .with_source(Arc::new(source)),
    )
}

#[test]
fn test_unreadable_subdirectory_does_not_abort_scan() {
    let source = MemorySource::new()
        .with_file("/data/a.txt", b"dup")
        .with_file("/data/public/b.txt", b"dup")
        .with_file("/data/private/c.txt", b"dup")
        .with_file("/data/private/nested/d.txt", b"dup")
        .with_unreadable_dir("/data/private");

    let (index, summary) = finder(source).find_duplicates(Path::new("/data")).unwrap();

    let dups = index.duplicates();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].len(), 2);
    assert_eq!(summary.error_count(), 1);
    match &summary.errors[0] {
        ScanError::DirectoryRead { path, source } => {
            assert_eq!(path, &PathBuf::from("/data/private"));
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("Expected DirectoryRead, got {:?}", other),
    }
}

#[test]
fn test_file_failing_mid_read_is_excluded() {
    let source = MemorySource::new()
        .with_file("/data/a", b"same bytes")
        .with_file("/data/b", b"same bytes")
        .with_failing_file("/data/c", b"same bytes", 4);

    let (index, summary) = finder(source).find_duplicates(Path::new("/data")).unwrap();

    let dups = index.duplicates();
    assert_eq!(dups.len(), 1);
    assert!(!dups[0].contains(Path::new("/data/c")));
    assert_eq!(summary.total_files, 2);
    assert!(matches!(
        &summary.errors[0],
        ScanError::FileRead { source: HashError::ReadFailure { .. }, .. }
    ));
}

#[test]
fn test_vanished_entry_keeps_rest_of_listing() {
    let source = MemorySource::new()
        .with_file("/data/a", b"twin")
        .with_vanished_entry("/data/b")
        .with_file("/data/c", b"twin")
        .with_file("/data/nested/d", b"twin");

    let (index, summary) = finder(source).find_duplicates(Path::new("/data")).unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.directories, 2);
    assert_eq!(index.duplicates()[0].len(), 3);
    assert!(matches!(
        &summary.errors[..],
        [ScanError::EntryRead { path, source }]
            if path == Path::new("/data/b") && source.kind() == io::ErrorKind::NotFound
    ));
}

#[test]
fn test_many_errors_all_collected() {
    let mut source = MemorySource::new().with_file("/data/ok", b"fine");
    for i in 0..10 {
        source = source.with_failing_file(format!("/data/bad{i}"), b"content", 0);
        source = source.with_unreadable_dir(format!("/data/locked{i}"));
    }

    let (_, summary) = finder(source).find_duplicates(Path::new("/data")).unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.error_count(), 20);
    let directory_errors = summary
        .errors
        .iter()
        .filter(|e| e.is_directory_error())
        .count();
    assert_eq!(directory_errors, 10);
}

#[test]
fn test_missing_root_is_fatal() {
    let result = DuplicateFinder::with_defaults()
        .find_duplicates(Path::new("/nonexistent/dupewalk/root"));

    assert!(matches!(result, Err(FinderError::RootPath { .. })));
}

#[test]
fn test_file_as_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    std::fs::write(&file, "x").unwrap();

    let result = DuplicateFinder::with_defaults().find_duplicates(&file);

    assert!(matches!(result, Err(FinderError::NotADirectory(p)) if p == file));
}

#[cfg(unix)]
#[test]
fn test_real_permission_denied_subdirectory() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "dup").unwrap();
    fs::write(dir.path().join("b.txt"), "dup").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c.txt"), "dup").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still list the directory
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let (index, summary) = result.unwrap();

    assert_eq!(index.duplicates()[0].len(), 2);
    assert_eq!(summary.error_count(), 1);
    assert!(summary.errors[0].is_directory_error());
}
