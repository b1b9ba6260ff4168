//! Entry point for the diagnostic packager launcher.
use std::process::ExitCode;

use diag_packager::{
    launcher::{run_launcher, TerminalPresenter},
    lib::telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = telemetry::init_tracing() {
        eprintln!("{err:?}");
    }
    run_launcher(std::env::args_os(), &TerminalPresenter)
        .await
        .into()
}
