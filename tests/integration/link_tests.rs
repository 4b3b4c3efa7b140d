use dupefind::duplicates::{DuplicateFinder, FinderConfig};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_hardlinks_reported_as_duplicates() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let hardlink = dir.path().join("hardlink.txt");

    File::create(&original)
        .unwrap()
        .write_all(b"identical content")
        .unwrap();

    if let Err(e) = fs::hard_link(&original, &hardlink) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    // Two directory entries with identical bytes, whatever backs them.
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 2);
    assert_eq!(report.summary.total_files, 2);
}

#[cfg(unix)]
#[test]
fn test_file_symlink_reported_under_link_path() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let symlink = dir.path().join("symlink.txt");

    File::create(&original)
        .unwrap()
        .write_all(b"shared content")
        .unwrap();
    std::os::unix::fs::symlink(&original, &symlink).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    let paths = report.groups[0].paths();
    assert!(paths.iter().any(|p| p.ends_with("original.txt")));
    assert!(paths.iter().any(|p| p.ends_with("symlink.txt")));
    assert!(report.groups[0]
        .files
        .iter()
        .any(|f| f.is_symlink && f.path.ends_with("symlink.txt")));
}

#[cfg(unix)]
#[test]
fn test_file_symlinks_ignored_when_disabled() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    std::fs::write(&original, b"shared content").unwrap();
    std::os::unix::fs::symlink(&original, dir.path().join("symlink.txt")).unwrap();

    let config = FinderConfig::default().with_follow_file_symlinks(false);
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_directory_symlink_cycle_terminates() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("a"), b"payload").unwrap();
    fs::write(dir.path().join("b"), b"payload").unwrap();
    std::os::unix::fs::symlink(dir.path(), sub.join("loop")).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    // The loop is neither descended into nor reported as a file.
    assert_eq!(report.summary.total_files, 2);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 2);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_a_warning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"x").unwrap();
    fs::write(dir.path().join("b"), b"x").unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].path().ends_with("dangling"));
}
