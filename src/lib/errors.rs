use std::{io, path::PathBuf};

use clap::error::ErrorKind;
use config::ConfigError as ConfigLoaderError;
use thiserror::Error;
use zip::result::ZipError;

/// Failure to turn the raw command line into an argument set.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Unable to interpret the command line: {0}")]
    Malformed(#[from] clap::Error),
}

impl ArgumentError {
    /// True when clap asked to print help or version text instead of running.
    pub fn is_informational(&self) -> bool {
        match self {
            ArgumentError::Malformed(err) => matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ),
        }
    }

    /// Print clap's own rendering (help text, usage, or error).
    pub fn print(&self) {
        match self {
            ArgumentError::Malformed(err) => {
                let _ = err.print();
            }
        }
    }
}

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Silent-mode command line problems that stop the run before packaging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("There is no transmit mode (-m) specified so the packager can't start.")]
    MissingTransmitMode,
    #[error("Unrecognized transmit mode: {token}.  Try server, email or file")]
    InvalidTransmitMode { token: String },
    #[error("There is no customer or server specified but the transmit mode is set to server.")]
    MissingServerInfo,
    #[error("There is no file name (-d) specified so the packager can't start.")]
    MissingFileInfo,
}

/// Failures raised by the packaging collaborator.
#[derive(Debug, Error)]
pub enum PackagerError {
    #[error("Failed to create packaging staging directory: {source}")]
    Staging {
        #[source]
        source: io::Error,
    },
    #[error("Failed to read session directory {path}: {source}")]
    SessionDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O failed for file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write package archive ({path}): {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("Session manifest {path} is not valid: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid {field} `{value}`: {message}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        message: String,
    },
    #[error("Failed to send package via {channel}: {message}")]
    Transport {
        channel: &'static str,
        message: String,
    },
    #[error("Packaging work stopped before finishing: {message}")]
    Task { message: String },
    #[error("The {field} `{value}` cannot name a session directory")]
    InvalidIdentity { field: &'static str, value: String },
    #[error("No session directory could be determined for product `{product}`")]
    NoSessionRoot { product: String },
}
