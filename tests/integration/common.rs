use std::{
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_diag-packager");

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

/// Run the launcher with `config` as its configuration file and no stdin.
pub fn run_packager(config: &Path, args: &[&str]) -> Output {
    Command::new(BINARY_PATH)
        .args(args)
        .env("PACKAGER_CONFIG_PATH", config)
        .env("RUST_LOG", "off")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("process should start")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
