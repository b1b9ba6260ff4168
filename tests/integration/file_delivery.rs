use std::{fs, path::PathBuf, time::Instant};

use tempfile::tempdir;

use crate::common::{fixture, run_packager, stdout_of};

fn identity_config() -> PathBuf {
    PathBuf::from(fixture("tests/fixtures/config_identity_only.toml"))
}

#[test]
fn file_mode_writes_archive_and_succeeds() {
    let sessions = tempdir().expect("sessions dir");
    fs::write(sessions.path().join("first.log"), "first").expect("write session");
    fs::write(sessions.path().join("second.log"), "second").expect("write session");
    let out = tempdir().expect("output dir");
    let destination = out.path().join("out.zip");

    let output = run_packager(
        &identity_config(),
        &[
            "-s",
            "-m",
            "file",
            "-d",
            &destination.display().to_string(),
            "-folder",
            &sessions.path().display().to_string(),
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout_of(&output));
    assert!(stdout_of(&output).is_empty());
    let archive = fs::read(&destination).expect("archive written");
    assert!(archive.starts_with(b"PK"));
}

#[test]
fn colon_and_equals_forms_are_accepted() {
    let sessions = tempdir().expect("sessions dir");
    fs::write(sessions.path().join("only.log"), "only").expect("write session");
    let out = tempdir().expect("output dir");
    let destination = out.path().join("colon.zip");

    let output = run_packager(
        &identity_config(),
        &[
            "-s",
            "-m:FILE",
            &format!("-d={}", destination.display()),
            &format!("-folder:{}", sessions.path().display()),
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(destination.exists());
}

#[test]
fn unparsable_wait_pid_does_not_block_the_run() {
    let sessions = tempdir().expect("sessions dir");
    fs::write(sessions.path().join("a.log"), "a").expect("write session");
    let out = tempdir().expect("output dir");
    let destination = out.path().join("wait.zip");

    let started = Instant::now();
    let output = run_packager(
        &identity_config(),
        &[
            "-s",
            "-w",
            "abc",
            "-m",
            "file",
            "-d",
            &destination.display().to_string(),
            "-folder",
            &sessions.path().display().to_string(),
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(started.elapsed().as_secs() < 30);
    assert!(destination.exists());
}

#[test]
fn unwritable_destination_exits_with_runtime_exception() {
    let sessions = tempdir().expect("sessions dir");
    fs::write(sessions.path().join("a.log"), "a").expect("write session");
    let out = tempdir().expect("output dir");
    let blocker = out.path().join("blocker");
    fs::write(&blocker, "not a directory").expect("write blocker");
    let destination = blocker.join("nested").join("out.zip");

    let output = run_packager(
        &identity_config(),
        &[
            "-s",
            "-m",
            "file",
            "-d",
            &destination.display().to_string(),
            "-folder",
            &sessions.path().display().to_string(),
        ],
    );

    assert_eq!(output.status.code(), Some(7));
    assert!(stdout_of(&output).contains("could not be sent"));
}

#[test]
fn unknown_flag_does_not_turn_silent_run_interactive() {
    let sessions = tempdir().expect("sessions dir");
    fs::write(sessions.path().join("a.log"), "a").expect("write session");
    let out = tempdir().expect("output dir");
    let destination = out.path().join("out.zip");

    let output = run_packager(
        &out.path().join("absent.toml"),
        &[
            "-s",
            "-p",
            "Acme",
            "-m",
            "file",
            "-d",
            &destination.display().to_string(),
            "--folder",
            &sessions.path().display().to_string(),
            "-x",
            "1",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout_of(&output));
    assert!(destination.exists());
}

#[test]
fn repeated_destination_uses_last_value() {
    let sessions = tempdir().expect("sessions dir");
    fs::write(sessions.path().join("a.log"), "a").expect("write session");
    let out = tempdir().expect("output dir");
    let first = out.path().join("first.zip");
    let again = out.path().join("again.zip");

    let output = run_packager(
        &identity_config(),
        &[
            "-s",
            "-m",
            "file",
            "-d",
            &first.display().to_string(),
            "-d",
            &again.display().to_string(),
            "--folder",
            &sessions.path().display().to_string(),
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout_of(&output));
    assert!(again.exists());
    assert!(!first.exists());
}

#[test]
fn unknown_flag_without_product_reports_silently() {
    let out = tempdir().expect("output dir");
    let output = run_packager(
        &out.path().join("absent.toml"),
        &["-s", "-m", "file", "-d", "out.zip", "-x", "1"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).contains("There is no product name specified"));
}
