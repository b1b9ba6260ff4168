use std::path::PathBuf;

use tempfile::tempdir;

use crate::common::{fixture, run_packager, stdout_of};

fn identity_config() -> PathBuf {
    PathBuf::from(fixture("tests/fixtures/config_identity_only.toml"))
}

#[test]
fn missing_product_name_exits_with_two() {
    let config = PathBuf::from(fixture("tests/fixtures/config_no_product.toml"));
    let output = run_packager(&config, &["-s", "-m", "file", "-d", "out.zip"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).contains("There is no product name specified"));
}

#[test]
fn absent_configuration_without_product_exits_with_two() {
    let dir = tempdir().expect("temp dir");
    let output = run_packager(&dir.path().join("absent.toml"), &["-s", "-m", "file"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn malformed_configuration_exits_with_one() {
    let config = PathBuf::from(fixture("tests/fixtures/config_malformed.toml"));
    let output = run_packager(&config, &["-s", "-p", "Acme", "-m", "file", "-d", "out.zip"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("configuration file could not be read"));
}

#[test]
fn silent_without_mode_exits_with_three() {
    let output = run_packager(&identity_config(), &["-s"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout_of(&output).contains("There is no transmit mode (-m) specified"));
}

#[test]
fn empty_mode_exits_with_three() {
    let output = run_packager(&identity_config(), &["-s", "-m"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn server_without_customer_or_server_exits_with_four() {
    let output = run_packager(&identity_config(), &["-s", "-m", "server", "-customer:"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stdout_of(&output).contains("no customer or server specified"));
}

#[test]
fn file_without_destination_exits_with_five() {
    let output = run_packager(&identity_config(), &["-s", "-m", "file"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stdout_of(&output).contains("There is no file name (-d) specified"));
}

#[test]
fn bogus_mode_exits_with_six_regardless_of_other_flags() {
    let output = run_packager(
        &identity_config(),
        &["-s", "-m", "bogus", "-d", "out.zip", "-customer", "acme"],
    );
    assert_eq!(output.status.code(), Some(6));
    assert!(stdout_of(&output).contains("Unrecognized transmit mode"));
}

#[test]
fn help_exits_successfully() {
    let output = run_packager(&identity_config(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("diag-packager"));
}
