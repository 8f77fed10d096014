//! Basic functionality integration tests for the cpf CLI.

use assert_cmd::cargo::cargo_bin_cmd;
use filetime::FileTime;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_basic_file_copy() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "hello world").unwrap();

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dst.path().join("test.txt")).unwrap(),
        "hello world"
    );
}

#[test]
fn test_blocking_file_copy() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "blocking").unwrap();

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg("--blocking")
        .arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dst.path().join("test.txt")).unwrap(),
        "blocking"
    );
}

#[test]
fn test_creates_missing_parent_directories() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "nested").unwrap();
    let target = dst.path().join("a/b/c/test.txt");

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg(src.path().join("test.txt"))
        .arg(&target)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&target).unwrap(), "nested");
}

#[test]
fn test_preserves_mtime() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let src_file = src.path().join("old.txt");
    fs::write(&src_file, "old").unwrap();
    let mtime = FileTime::from_unix_time(1_400_000_000, 0);
    filetime::set_file_mtime(&src_file, mtime).unwrap();

    for blocking in [false, true] {
        let dst_file = dst.path().join(format!("old-{blocking}.txt"));
        let mut cmd = cargo_bin_cmd!("cpf");
        if blocking {
            cmd.arg("--blocking");
        }
        cmd.arg(&src_file).arg(&dst_file).assert().success();

        let meta = fs::metadata(&dst_file).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
    }
}

#[test]
fn test_no_times_flag() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let src_file = src.path().join("old.txt");
    fs::write(&src_file, "old").unwrap();
    let mtime = FileTime::from_unix_time(1_400_000_000, 0);
    filetime::set_file_mtime(&src_file, mtime).unwrap();

    let dst_file = dst.path().join("old.txt");
    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg("--no-times")
        .arg(&src_file)
        .arg(&dst_file)
        .assert()
        .success();

    let meta = fs::metadata(&dst_file).unwrap();
    assert!(FileTime::from_last_modification_time(&meta) > mtime);
}

#[test]
fn test_overwrites_by_default() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "new content").unwrap();
    fs::write(dst.path().join("test.txt"), "old content").unwrap();

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dst.path().join("test.txt")).unwrap(),
        "new content"
    );
}

#[test]
fn test_no_clobber_keeps_destination() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "new content").unwrap();
    fs::write(dst.path().join("test.txt"), "old content").unwrap();

    for mode in [None, Some("--blocking")] {
        let mut cmd = cargo_bin_cmd!("cpf");
        if let Some(flag) = mode {
            cmd.arg(flag);
        }
        cmd.arg("-n")
            .arg("-v")
            .arg(src.path().join("test.txt"))
            .arg(dst.path().join("test.txt"))
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    assert_eq!(
        fs::read_to_string(dst.path().join("test.txt")).unwrap(),
        "old content"
    );
}

#[test]
fn test_verbose_reports_bytes() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "hello world").unwrap();

    let mut cmd = cargo_bin_cmd!("cpf");
    cmd.arg("-v")
        .arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("11 bytes"));
}

#[cfg(unix)]
#[test]
fn test_no_perms_flag_in_both_modes() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let script = src.path().join("run.sh");
    fs::write(&script, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o700)).unwrap();

    for (mode_flag, name) in [("--blocking", "blocking.sh"), ("-v", "async.sh")] {
        let target = dst.path().join(name);
        let mut cmd = cargo_bin_cmd!("cpf");
        cmd.arg("--no-perms")
            .arg(mode_flag)
            .arg(&script)
            .arg(&target)
            .assert()
            .success();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0, "{name} kept exec bits");
    }
}
