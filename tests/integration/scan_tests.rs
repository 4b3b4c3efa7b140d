use dupefind::duplicates::{DuplicateFinder, FinderConfig, ScanReport};
use dupefind::scanner::{ContentDigest, DigestState, Hash, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn relative_groups(report: &ScanReport) -> Vec<Vec<String>> {
    report
        .relative_path_lists()
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .collect()
        })
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let report = dupefind::find_duplicates(dir.path(), FinderConfig::default()).unwrap();

    assert!(report.groups.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert_eq!(report.summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.eliminated_by_digest, 3);
}

#[test]
fn test_scan_duplicates_across_subdirectories() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/1.txt"), b"ABC");
    write(&dir.path().join("a/2.txt"), b"ABC");
    write(&dir.path().join("b/3.txt"), b"ABD");
    write(&dir.path().join("b/4.txt"), b"ABC");
    write(&dir.path().join("c.txt"), b"XYZW");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(
        relative_groups(&report),
        vec![vec!["a/1.txt", "a/2.txt", "b/4.txt"]]
    );
    assert_eq!(report.summary.total_files, 5);
    assert_eq!(report.summary.eliminated_by_size, 1);
    assert_eq!(report.summary.duplicate_groups, 1);
    assert_eq!(report.summary.duplicate_files, 2);
    assert_eq!(report.summary.reclaimable_space, 6);
}

#[test]
fn test_scan_groups_ordered_by_first_discovery() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/x"), b"second group");
    write(&dir.path().join("a/y"), b"first  group");
    write(&dir.path().join("b/x"), b"second group");
    write(&dir.path().join("b/y"), b"first  group");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(
        relative_groups(&report),
        vec![vec!["a/x", "b/x"], vec!["a/y", "b/y"]]
    );
}

#[test]
fn test_scan_empty_files_form_a_group() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("e1"), b"");
    write(&dir.path().join("e2"), b"");
    write(&dir.path().join("full"), b"data");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(relative_groups(&report), vec![vec!["e1", "e2"]]);
    assert_eq!(report.groups[0].size, 0);
    assert_eq!(report.summary.reclaimable_space, 0);
}

#[test]
fn test_scan_multi_chunk_files() {
    let dir = tempdir().unwrap();
    let mut base = vec![7u8; 10_000];
    write(&dir.path().join("one"), &base);
    write(&dir.path().join("two"), &base);
    // Same size, differs only in the final byte.
    *base.last_mut().unwrap() = 8;
    write(&dir.path().join("three"), &base);

    let config = FinderConfig::default().with_chunk_size(1024);
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(relative_groups(&report), vec![vec!["one", "two"]]);
}

#[test]
fn test_scan_with_size_filter() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"ab");
    write(&dir.path().join("small2"), b"ab");
    write(&dir.path().join("large1"), &[1u8; 100]);
    write(&dir.path().join("large2"), &[1u8; 100]);

    let walker_config = WalkerConfig::default().with_size_range(Some(10), None);
    let config = FinderConfig::default().with_walker_config(walker_config);
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(relative_groups(&report), vec![vec!["large1", "large2"]]);
    assert_eq!(report.summary.total_files, 2);
}

#[test]
fn test_scan_with_ignore_patterns() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("keep1.txt"), b"same");
    write(&dir.path().join("keep2.txt"), b"same");
    write(&dir.path().join("skip.tmp"), b"same");
    write(&dir.path().join("cache/inner.txt"), b"same");

    let walker_config = WalkerConfig::default()
        .with_ignore_patterns(vec!["*.tmp".to_string(), "cache/".to_string()]);
    let config = FinderConfig::default().with_walker_config(walker_config);
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(relative_groups(&report), vec![vec!["keep1.txt", "keep2.txt"]]);
}

#[test]
fn test_hidden_files_included_unless_skipped() {
    let dir = tempdir().unwrap();
    write(&dir.path().join(".hidden"), b"twin");
    write(&dir.path().join("visible"), b"twin");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(relative_groups(&report), vec![vec![".hidden", "visible"]]);

    let config = FinderConfig::default()
        .with_walker_config(WalkerConfig::default().with_skip_hidden(true));
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(report.groups.is_empty());
}

struct ConstantDigest;
struct ConstantState;

impl DigestState for ConstantState {
    fn update(&mut self, _data: &[u8]) {}
    fn finish(self: Box<Self>) -> Hash {
        [0u8; 32]
    }
}

impl ContentDigest for ConstantDigest {
    fn name(&self) -> &'static str {
        "constant"
    }
    fn start(&self) -> Box<dyn DigestState> {
        Box::new(ConstantState)
    }
}

#[test]
fn test_digest_collision_never_groups_distinct_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("p1"), b"AAAA");
    write(&dir.path().join("p2"), b"BBBB");
    write(&dir.path().join("p3"), b"AAAA");
    write(&dir.path().join("p4"), b"CCCC");
    write(&dir.path().join("p5"), b"BBBB");

    let config = FinderConfig::default().with_digest(Arc::new(ConstantDigest));
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(
        relative_groups(&report),
        vec![vec!["p1", "p3"], vec!["p2", "p5"]]
    );
    assert_eq!(report.summary.digest_collisions, 2);
}

#[test]
fn test_sha256_matches_blake3_grouping() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"same bytes");
    write(&dir.path().join("b"), b"same bytes");
    write(&dir.path().join("c"), b"diff bytes");

    let blake = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let sha = DuplicateFinder::new(
        FinderConfig::default().with_hash_algorithm(dupefind::scanner::HashAlgorithm::Sha256),
    )
    .find_duplicates(dir.path())
    .unwrap();

    assert_eq!(blake.path_lists(), sha.path_lists());
    assert_ne!(blake.groups[0].hash, sha.groups[0].hash);
}
