use clap::Parser;
use slideshow::catalog::ImageCatalog;
use slideshow::cli::{Cli, EXIT_CONFIG, EXIT_FAILURE, EXIT_NO_INPUT, EXIT_USAGE, exit_code};
use slideshow::playlist::PlaylistController;
use slideshow::scan::ScanOptions;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("slideshow").chain(args.iter().copied())).unwrap()
}

#[test]
fn flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "library-path: /from/file\ninterval: 1m\nhistory-size: 3\nmax-files: 50\nshuffle-seed: 1\n",
    )
    .unwrap();
    let cfg_arg = path.to_str().unwrap();

    let (cfg, root) = cli(&["-c", cfg_arg]).resolve().unwrap();
    assert_eq!(root, PathBuf::from("/from/file"));
    assert_eq!(cfg.interval, Duration::from_secs(60));
    assert_eq!(cfg.history_size, 3);

    let (cfg, root) = cli(&[
        "-c",
        cfg_arg,
        "--interval",
        "15s",
        "--history-size",
        "8",
        "--max-files",
        "5",
        "--seed",
        "42",
        "/from/cli",
    ])
    .resolve()
    .unwrap();
    assert_eq!(root, PathBuf::from("/from/cli"));
    assert_eq!(cfg.interval, Duration::from_secs(15));
    assert_eq!(cfg.history_size, 8);
    assert_eq!(cfg.max_files, Some(5));
    assert_eq!(cfg.shuffle_seed, Some(42));
}

#[test]
fn missing_root_is_a_usage_error() {
    let err = cli(&[]).resolve().unwrap_err();
    assert_eq!(exit_code(&err), EXIT_USAGE);
}

#[test]
fn invalid_settings_are_config_errors() {
    let err = cli(&["--history-size", "0", "/photos"]).resolve().unwrap_err();
    assert_eq!(exit_code(&err), EXIT_CONFIG);
    assert!(err.to_string().contains("history-size"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "interval: [not, a, duration]\n").unwrap();
    let err = cli(&["-c", path.to_str().unwrap(), "/photos"])
        .resolve()
        .unwrap_err();
    assert_eq!(exit_code(&err), EXIT_CONFIG);

    let cat = Arc::new(ImageCatalog::from_paths("/p", [PathBuf::from("/p/a.jpg")]).unwrap());
    let err = anyhow::Error::from(PlaylistController::new(cat, 0).unwrap_err());
    assert_eq!(exit_code(&err), EXIT_CONFIG);
}

#[test]
fn bad_or_empty_directory_is_no_input() {
    let dir = tempfile::tempdir().unwrap();
    let empty = ImageCatalog::build(dir.path(), &ScanOptions::default()).unwrap_err();
    let err = anyhow::Error::from(empty).context("scanning");
    assert_eq!(exit_code(&err), EXIT_NO_INPUT);

    let missing = ImageCatalog::build(dir.path().join("gone"), &ScanOptions::default()).unwrap_err();
    assert_eq!(exit_code(&anyhow::Error::from(missing)), EXIT_NO_INPUT);

    assert_eq!(exit_code(&anyhow::anyhow!("loader channel closed")), EXIT_FAILURE);
}

fn run_binary(args: &[&OsStr]) -> (Option<i32>, String) {
    let out = Command::new(env!("CARGO_BIN_EXE_slideshow"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    (out.status.code(), String::from_utf8_lossy(&out.stderr).into_owned())
}

#[test]
fn binary_reports_exit_statuses() {
    let (code, stderr) = run_binary(&[]);
    assert_eq!(code, Some(i32::from(EXIT_USAGE)));
    assert!(stderr.contains("no image directory given"), "{stderr}");

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
    let (code, stderr) = run_binary(&[dir.path().as_os_str()]);
    assert_eq!(code, Some(i32::from(EXIT_NO_INPUT)));
    assert!(stderr.contains(&dir.path().display().to_string()), "{stderr}");

    let (code, _) = run_binary(&[
        OsStr::new("--history-size"),
        OsStr::new("0"),
        dir.path().as_os_str(),
    ]);
    assert_eq!(code, Some(i32::from(EXIT_CONFIG)));
}
