//! Run mode, wait request, and effective product identity resolution.
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use tracing::error;

use super::Arguments;
use crate::launcher::config::ConfigRecord;

const DEFAULT_CONFIG: &str = "packager.toml";
const PACKAGER_CONFIG_ENV: &str = "PACKAGER_CONFIG_PATH";
/// Upper bound for waiting on a monitored process.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Interactive unless `-s` was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Silent,
}

impl RunMode {
    pub fn from_args(args: &Arguments) -> Self {
        if args.silent {
            RunMode::Silent
        } else {
            RunMode::Interactive
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            RunMode::Interactive => "interactive",
            RunMode::Silent => "silent",
        }
    }
}

/// Request to wait for an external process before packaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    pub pid: i32,
    pub timeout: Duration,
}

impl WaitSpec {
    /// Build from `-w`. An unparsable pid is logged and yields no wait.
    pub fn from_args(args: &Arguments) -> Option<Self> {
        let raw = args.wait_pid.as_deref()?;
        match raw.trim().parse::<i32>() {
            Ok(pid) => Some(Self {
                pid,
                timeout: DEFAULT_WAIT_TIMEOUT,
            }),
            Err(_) => {
                error!(
                    target: "diag_packager::startup",
                    raw_pid = raw,
                    "The command line argument for Process ID could not be interpreted as a number"
                );
                None
            }
        }
    }
}

/// Product identity after command-line overrides were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub product_name: Option<String>,
    pub application_name: Option<String>,
    pub output_folder: Option<String>,
}

impl EffectiveConfig {
    /// Product name, treating an empty override as missing.
    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn application_name(&self) -> Option<&str> {
        self.application_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    pub fn output_folder(&self) -> Option<&Path> {
        self.output_folder
            .as_deref()
            .filter(|folder| !folder.is_empty())
            .map(Path::new)
    }
}

/// Merge configured identity with command-line overrides. A flag that is
/// present wins even when its value is empty.
pub fn resolve_config(args: &Arguments, configured: Option<&ConfigRecord>) -> EffectiveConfig {
    let product_name = args
        .product
        .clone()
        .or_else(|| configured.and_then(|record| record.product_name.clone()));
    let application_name = args
        .application
        .clone()
        .or_else(|| configured.and_then(|record| record.application_name.clone()));

    EffectiveConfig {
        product_name,
        application_name,
        output_folder: args.folder.clone(),
    }
}

/// Resolve config path in the order: CLI override → env var → default.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    let path = override_path
        .or_else(|| {
            env::var_os(PACKAGER_CONFIG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = env::current_dir().context("failed to obtain current directory")?;
    Ok(cwd.join(path))
}
