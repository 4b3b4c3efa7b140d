use dupefind::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupefind::error::ExitCode;
use dupefind::progress::ProgressCallback;
use dupefind::scanner::WarningKind;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_nonexistent_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = dupefind::find_duplicates(&missing, FinderConfig::default()).unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(ref p) if *p == missing));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"content").unwrap();

    let err = dupefind::find_duplicates(&file, FinderConfig::default()).unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[test]
fn test_cancelled_scan_returns_no_result() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let config = FinderConfig::default().with_shutdown_flag(flag);
    let err = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap_err();

    assert!(matches!(err, FinderError::Interrupted));
    assert_eq!(
        ExitCode::for_error(&anyhow::Error::new(err)),
        ExitCode::Interrupted
    );
}

/// Deletes a directory as soon as the walk reports a given file.
struct RemoveOnFile {
    trigger: &'static str,
    doomed: PathBuf,
}

impl ProgressCallback for RemoveOnFile {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    fn on_progress(&self, _current: usize, path: &str) {
        if path.ends_with(self.trigger) && self.doomed.exists() {
            fs::remove_dir_all(&self.doomed).unwrap();
        }
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_subtree_vanishing_during_walk_is_a_warning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();
    let doomed = dir.path().join("c_dir");
    fs::create_dir(&doomed).unwrap();
    fs::write(doomed.join("inner"), b"dup").unwrap();

    // A single walker thread lists c_dir only after reporting `b`
    let config = FinderConfig::default()
        .with_max_concurrency(1)
        .with_progress_callback(Arc::new(RemoveOnFile {
            trigger: "b",
            doomed: doomed.clone(),
        }));
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind(), WarningKind::Subtree);
    assert!(report.warnings[0].path().ends_with("c_dir"));
    assert_eq!(ExitCode::for_report(&report), ExitCode::PartialSuccess);
}

#[cfg(unix)]
fn restrict(path: &std::path::Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_subtree_is_a_warning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c"), b"dup").unwrap();
    restrict(&locked, 0o000);
    let privileged = fs::read_dir(&locked).is_ok();

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    restrict(&locked, 0o755);
    let report = result.unwrap();

    if privileged {
        // Permission bits do not bind this process, so the subtree is read
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].files.len(), 3);
        assert!(report.warnings.is_empty());
        return;
    }

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].files.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind(), WarningKind::Subtree);
    assert!(report.warnings[0].path().ends_with("locked"));
    assert_eq!(ExitCode::for_report(&report), ExitCode::PartialSuccess);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_excluded_from_groups() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();
    let secret = dir.path().join("c");
    fs::write(&secret, b"dup").unwrap();
    restrict(&secret, 0o000);
    let privileged = fs::read(&secret).is_ok();

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    restrict(&secret, 0o644);
    let report = result.unwrap();

    if privileged {
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].files.len(), 3);
        assert!(report.warnings.is_empty());
        return;
    }

    assert_eq!(report.groups.len(), 1);
    assert!(report.groups[0].paths().iter().all(|p| !p.ends_with("c")));
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind(), WarningKind::File);
}

#[test]
fn test_exit_codes_for_completed_scans() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only"), b"one").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(ExitCode::for_report(&report), ExitCode::NoDuplicates);

    fs::write(dir.path().join("twin"), b"one").unwrap();
    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(ExitCode::for_report(&report), ExitCode::Success);
}
