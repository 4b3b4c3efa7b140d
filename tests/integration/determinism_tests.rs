use dupefind::duplicates::{DuplicateFinder, FinderConfig};
use dupefind::scanner::FileEntry;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(root: &Path) {
    for d in 0..4 {
        let sub = root.join(format!("dir_{d}"));
        fs::create_dir_all(sub.join("nested")).unwrap();
        for f in 0..6 {
            let content = format!("content-{}", f % 3);
            fs::write(sub.join(format!("file_{f}.txt")), &content).unwrap();
            fs::write(sub.join("nested").join(format!("n_{f}")), &content).unwrap();
        }
        fs::write(sub.join("unique"), format!("unique-{d}")).unwrap();
    }
}

#[test]
fn test_rescan_is_identical() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let finder = DuplicateFinder::with_defaults();
    let first = finder.find_duplicates(dir.path()).unwrap();
    let second = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.path_lists(), second.path_lists());
    assert_eq!(first.summary.total_files, second.summary.total_files);
    assert_eq!(first.groups.len(), 3);
}

#[test]
fn test_result_independent_of_thread_count() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let serial = DuplicateFinder::new(FinderConfig::default().with_max_concurrency(1))
        .find_duplicates(dir.path())
        .unwrap();

    for threads in [2, 4, 8] {
        let parallel = DuplicateFinder::new(FinderConfig::default().with_max_concurrency(threads))
            .find_duplicates(dir.path())
            .unwrap();
        assert_eq!(serial.path_lists(), parallel.path_lists(), "threads = {threads}");
    }
}

#[test]
fn test_members_and_groups_in_discovery_order() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    for group in &report.groups {
        let indices: Vec<usize> = group.files.iter().map(|f| f.index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }
    let firsts: Vec<usize> = report.groups.iter().map(|g| g.first_index()).collect();
    let mut sorted = firsts.clone();
    sorted.sort_unstable();
    assert_eq!(firsts, sorted);
}

#[test]
fn test_from_files_follows_entry_index() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    for p in [&a, &b, &c] {
        fs::write(p, b"same").unwrap();
    }

    let files = vec![
        FileEntry::new(c.clone(), 4, 0),
        FileEntry::new(a.clone(), 4, 1),
        FileEntry::new(b.clone(), 4, 2),
    ];
    let report = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(report.path_lists(), vec![vec![c, a, b]]);
    assert!(report.root.as_os_str().is_empty());
}
