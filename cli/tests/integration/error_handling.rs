//! Error handling integration tests for the cpf CLI.
//!
//! Failures must name the operation and the path(s) involved.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_source() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let missing = src.path().join("nope.txt");

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg(&missing)
        .arg(dst.path().join("out.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[not-found]"))
        .stderr(predicate::str::contains("Cannot stat path"))
        .stderr(predicate::str::contains(missing.display().to_string()));

    assert!(!dst.path().join("out.txt").exists());
}

#[test]
fn test_source_is_directory() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg(src.path())
        .arg(dst.path().join("out.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[is-a-directory]"))
        .stderr(predicate::str::contains("Cannot copy from"));
}

#[test]
fn test_copy_onto_itself_keeps_content() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("same.txt");
    fs::write(&file, "precious data").unwrap();

    for mode_flag in ["--blocking", "-v"] {
        let mut cmd = cargo_bin_cmd!("cpf");
        cmd.arg(mode_flag)
            .arg(&file)
            .arg(&file)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("error[io]"))
            .stderr(predicate::str::contains("same file"));

        assert_eq!(fs::read_to_string(&file).unwrap(), "precious data");
    }
}

#[test]
fn test_parent_is_a_file() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "content").unwrap();
    fs::write(dst.path().join("blocker"), "not a directory").unwrap();

    for mode in [None, Some("--blocking")] {
        let mut cmd = cargo_bin_cmd!("cpf");
        if let Some(flag) = mode {
            cmd.arg(flag);
        }
        cmd.arg(src.path().join("test.txt"))
            .arg(dst.path().join("blocker/sub/test.txt"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot create directory"));
    }
}

#[test]
fn test_missing_arguments() {
    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.assert().failure().code(2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_source() {
    use std::os::unix::fs::PermissionsExt;

    // Root ignores permission bits
    if running_as_root() {
        return;
    }

    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let src_file = src.path().join("secret.txt");
    fs::write(&src_file, "secret").unwrap();
    fs::set_permissions(&src_file, fs::Permissions::from_mode(0o000)).unwrap();

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg(&src_file)
        .arg(dst.path().join("secret.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[permission-denied]"))
        .stderr(predicate::str::contains("Cannot read from"));

    // Fails before the destination is touched
    assert!(!dst.path().join("secret.txt").exists());

    fs::set_permissions(&src_file, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
fn running_as_root() -> bool {
    std::env::var("USER").map(|u| u == "root").unwrap_or(false)
        || fs::read_to_string("/proc/self/status")
            .map(|s| {
                s.lines()
                    .any(|l| l.starts_with("Uid:") && l.split_whitespace().nth(1) == Some("0"))
            })
            .unwrap_or(false)
}
