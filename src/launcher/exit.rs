//! Terminal exit codes and the user-facing report for each of them.
use std::process::ExitCode;

use tracing::{error, info};

use crate::{cli::RunMode, lib::errors::ValidationError};

use super::presenter::Presenter;

const DIALOG_TITLE: &str = "Unable to Package Information";

/// The single outcome of a launcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherExit {
    Success,
    BadConfigurationFile,
    MissingProductName,
    MissingTransmitMode,
    MissingServerInfo,
    MissingFileInfo,
    InvalidTransmitMode,
    RuntimeException,
}

impl LauncherExit {
    pub const fn code(&self) -> u8 {
        match self {
            LauncherExit::Success => 0,
            LauncherExit::BadConfigurationFile => 1,
            LauncherExit::MissingProductName => 2,
            LauncherExit::MissingTransmitMode => 3,
            LauncherExit::MissingServerInfo => 4,
            LauncherExit::MissingFileInfo => 5,
            LauncherExit::InvalidTransmitMode => 6,
            LauncherExit::RuntimeException => 7,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            LauncherExit::Success => "success",
            LauncherExit::BadConfigurationFile => "bad_configuration_file",
            LauncherExit::MissingProductName => "missing_product_name",
            LauncherExit::MissingTransmitMode => "missing_transmit_mode",
            LauncherExit::MissingServerInfo => "missing_server_info",
            LauncherExit::MissingFileInfo => "missing_file_info",
            LauncherExit::InvalidTransmitMode => "invalid_transmit_mode",
            LauncherExit::RuntimeException => "runtime_exception",
        }
    }

    /// Console line printed in silent mode, if any.
    pub const fn console_message(&self) -> Option<&'static str> {
        match self {
            LauncherExit::Success => None,
            LauncherExit::BadConfigurationFile => Some(
                "The packager configuration file could not be read so the packager can't start.",
            ),
            LauncherExit::MissingProductName => {
                Some("There is no product name specified so the packager can't start.")
            }
            LauncherExit::MissingTransmitMode => {
                Some("There is no transmit mode (-m) specified so the packager can't start.")
            }
            LauncherExit::MissingServerInfo => Some(
                "There is no customer or server specified but the transmit mode is set to server.",
            ),
            LauncherExit::MissingFileInfo => {
                Some("There is no file name (-d) specified so the packager can't start.")
            }
            LauncherExit::InvalidTransmitMode => {
                Some("Unrecognized transmit mode: Try server, email or file")
            }
            LauncherExit::RuntimeException => {
                Some("The diagnostic package could not be sent; see the log for details.")
            }
        }
    }

    /// Blocking message shown in interactive mode, if any. Only failures that
    /// happen before the interactive hand-off have one.
    pub const fn dialog_message(&self) -> Option<&'static str> {
        match self {
            LauncherExit::MissingProductName => Some(
                "Diagnostic information can't be packaged because no product was configured.\nPlease configure a product name in the packager.toml file.",
            ),
            LauncherExit::BadConfigurationFile => Some(
                "Diagnostic information can't be packaged because the packager.toml file could not be read.\nPlease correct the configuration file.",
            ),
            _ => None,
        }
    }
}

impl From<ValidationError> for LauncherExit {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::MissingTransmitMode => LauncherExit::MissingTransmitMode,
            ValidationError::InvalidTransmitMode { .. } => LauncherExit::InvalidTransmitMode,
            ValidationError::MissingServerInfo => LauncherExit::MissingServerInfo,
            ValidationError::MissingFileInfo => LauncherExit::MissingFileInfo,
        }
    }
}

impl From<LauncherExit> for ExitCode {
    fn from(value: LauncherExit) -> Self {
        ExitCode::from(value.code())
    }
}

/// Emit the log record and the user-visible message for `exit`.
pub fn report(exit: LauncherExit, mode: RunMode, presenter: &dyn Presenter) {
    if exit == LauncherExit::Success {
        info!(
            target: "diag_packager::exit",
            mode = mode.as_str(),
            exit_code = exit.code(),
            "Packager finished"
        );
        return;
    }

    error!(
        target: "diag_packager::exit",
        mode = mode.as_str(),
        exit_code = exit.code(),
        outcome = exit.as_str(),
        "Packager stopped"
    );

    match mode {
        RunMode::Silent => {
            if let Some(message) = exit.console_message() {
                println!("{message}");
            }
        }
        RunMode::Interactive => {
            if let Some(message) = exit.dialog_message() {
                presenter.show_blocking_message(DIALOG_TITLE, message);
            }
        }
    }
}
