use clap::Parser;
use dupefind::cli::Cli;
use dupefind::error::ExitCode;
use figment::Jail;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Run the app inside a jail so `DUPEFIND_*` variables set by other tests
/// cannot leak in.
fn run_isolated(config: &str, args: Vec<String>) -> (anyhow::Result<ExitCode>, String) {
    let mut outcome = None;
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", config)?;
        let mut argv = vec![
            "dupefind".to_string(),
            "--quiet".to_string(),
            "--config".to_string(),
            "config.toml".to_string(),
        ];
        argv.extend(args);

        let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
        let mut out = Vec::new();
        let result = dupefind::run_app_with_writer(cli, &mut out);
        outcome = Some((result, String::from_utf8_lossy(&out).into_owned()));
        Ok(())
    });
    outcome.unwrap()
}

fn run(root: &Path, extra: &[&str]) -> (anyhow::Result<ExitCode>, String) {
    let mut args = vec![
        "scan".to_string(),
        root.to_string_lossy().into_owned(),
        "--no-progress".to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    run_isolated("", args)
}

fn scenario() -> TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("a/1.txt"), b"ABC").unwrap();
    fs::write(dir.path().join("a/2.txt"), b"ABC").unwrap();
    fs::write(dir.path().join("b/3.txt"), b"ABD").unwrap();
    fs::write(dir.path().join("b/4.txt"), b"ABC").unwrap();
    fs::write(dir.path().join("c.txt"), b"XYZW").unwrap();
    dir
}

#[test]
fn test_json_groups_only_relative() {
    let dir = scenario();
    let (result, out) = run(
        dir.path(),
        &["--output", "json", "--groups-only", "--relative"],
    );

    assert_eq!(result.unwrap(), ExitCode::Success);
    let lists: Vec<Vec<String>> = serde_json::from_str(&out).unwrap();
    assert_eq!(lists, vec![vec!["a/1.txt", "a/2.txt", "b/4.txt"]]);
}

#[test]
fn test_json_full_report() {
    let dir = scenario();
    let (result, out) = run(dir.path(), &["--output", "json"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["groups"].as_array().unwrap().len(), 1);
    assert_eq!(value["groups"][0]["count"], 3);
    assert_eq!(value["summary"]["total_files"], 5);
    assert!(value["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_csv_output() {
    let dir = scenario();
    let (result, out) = run(dir.path(), &["--output", "csv", "--relative"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "group_id,hash,size,path");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].ends_with(",3,a/1.txt"));
}

#[test]
fn test_text_output_lists_paths() {
    let dir = scenario();
    let (result, out) = run(dir.path(), &["--relative"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("a/1.txt"));
    assert!(out.contains("b/4.txt"));
    assert!(!out.contains("c.txt"));
}

#[test]
fn test_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lonely"), b"one of a kind").unwrap();

    let (result, out) = run(dir.path(), &["--output", "json", "--groups-only"]);
    assert_eq!(result.unwrap(), ExitCode::NoDuplicates);
    assert_eq!(out.trim(), "[]");
}

#[test]
fn test_missing_root_is_error() {
    let dir = tempdir().unwrap();
    let (result, _) = run(&dir.path().join("missing"), &[]);

    let err = result.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_config_command_prints_toml() {
    let (result, text) = run_isolated("threads = 3\n", vec!["config".to_string()]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(text.contains("threads = 3"));
    assert!(text.contains("hash = \"blake3\""));
}
