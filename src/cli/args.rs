//! Command-line flag definitions (the argument view consumed by the launcher).
use std::{ffi::OsString, iter::Peekable, path::PathBuf};

use clap::Parser;
use tracing::warn;

use crate::lib::errors::ArgumentError;

/// Multi-character flags that may also be written with a single dash.
const LONG_FLAGS: &[&str] = &[
    "folder",
    "customer",
    "server",
    "port",
    "ssl",
    "directory",
    "repository",
    "purgeSentSessions",
    "user",
    "password",
    "config",
];

/// Single-character flags that take a value.
const SHORT_FLAGS: &[&str] = &["p", "a", "w", "m", "d", "f"];

/// The only flag that never takes a value.
const SWITCH_FLAG: &str = "s";

/// Passed to clap untouched.
const INFO_FLAGS: &[&str] = &["-h", "--help", "-V", "--version"];

/// Parsed flags. Every value-taking flag may be given without a value, which
/// reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(
    name = "diag-packager",
    author,
    version,
    about = "Package diagnostic sessions and send them to a server, by email, or to a file",
    long_about = None,
    args_override_self = true
)]
pub struct Arguments {
    /// Product name (overrides the configured value, even when empty).
    #[arg(short = 'p', num_args = 0..=1, default_missing_value = "")]
    pub product: Option<String>,
    /// Application name (overrides the configured value, even when empty).
    #[arg(short = 'a', num_args = 0..=1, default_missing_value = "")]
    pub application: Option<String>,
    /// Folder holding the sessions to package.
    #[arg(long = "folder", num_args = 0..=1, default_missing_value = "")]
    pub folder: Option<String>,
    /// Run without any interactive prompt.
    #[arg(short = 's', default_value_t = false)]
    pub silent: bool,
    /// Process id to wait on before packaging.
    #[arg(
        short = 'w',
        num_args = 0..=1,
        default_missing_value = "",
        allow_negative_numbers = true
    )]
    pub wait_pid: Option<String>,
    /// Transmit mode: server, email or file.
    #[arg(short = 'm', num_args = 0..=1, default_missing_value = "")]
    pub transmit_mode: Option<String>,
    /// Destination: email address (email mode) or file path (file mode).
    #[arg(short = 'd', num_args = 0..=1, default_missing_value = "")]
    pub destination: Option<String>,
    /// Sender address (email mode).
    #[arg(short = 'f', num_args = 0..=1, default_missing_value = "")]
    pub from: Option<String>,
    /// Customer name for the hosted hub (server mode).
    #[arg(long = "customer", num_args = 0..=1, default_missing_value = "")]
    pub customer: Option<String>,
    /// Explicit server host (server or email mode).
    #[arg(long = "server", num_args = 0..=1, default_missing_value = "")]
    pub server: Option<String>,
    /// Server port; unparsable values read as 0.
    #[arg(
        long = "port",
        num_args = 0..=1,
        default_missing_value = "",
        allow_negative_numbers = true
    )]
    pub port: Option<String>,
    /// Use SSL (`true`/`false`); unparsable values read as false.
    #[arg(long = "ssl", num_args = 0..=1, default_missing_value = "")]
    pub ssl: Option<String>,
    /// Base directory on an explicit server.
    #[arg(long = "directory", num_args = 0..=1, default_missing_value = "")]
    pub directory: Option<String>,
    /// Repository on an explicit server.
    #[arg(long = "repository", num_args = 0..=1, default_missing_value = "")]
    pub repository: Option<String>,
    /// Delete sessions after they were sent (`true`/`false`).
    #[arg(long = "purgeSentSessions", num_args = 0..=1, default_missing_value = "")]
    pub purge_sent_sessions: Option<String>,
    /// SMTP user (email mode with explicit server).
    #[arg(long = "user", num_args = 0..=1, default_missing_value = "")]
    pub user: Option<String>,
    /// SMTP password, only read when a user is given.
    #[arg(long = "password", num_args = 0..=1, default_missing_value = "")]
    pub password: Option<String>,
    /// Path to packager.toml (overrides PACKAGER_CONFIG_PATH).
    #[arg(long = "config")]
    pub config_path: Option<PathBuf>,
}

impl Arguments {
    /// Parse a raw argument list (program name first).
    pub fn parse_raw<I, T>(raw: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let normalized = normalize_raw_args(raw.into_iter().map(Into::into));
        Ok(Self::try_parse_from(normalized)?)
    }
}

/// Rewrite the raw command line into the canonical form clap parses.
///
/// Single-dash long flags and `name:value` / `name=value` forms are accepted.
/// Unknown flags (with the value that follows them) and stray values are
/// logged and dropped, so the recognised flags always survive.
pub fn normalize_raw_args<I>(raw: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = raw.into_iter().peekable();
    let mut out: Vec<OsString> = iter.next().into_iter().collect();

    while let Some(token) = iter.next() {
        let Some(text) = token.to_str() else {
            warn!(
                target: "diag_packager::startup",
                token = ?token,
                "Ignoring command line token that is not valid UTF-8"
            );
            continue;
        };
        if INFO_FLAGS.contains(&text) {
            out.push(token.clone());
            continue;
        }
        let Some((name, inline)) = split_flag(text) else {
            warn!(
                target: "diag_packager::startup",
                token = text,
                "Ignoring unexpected command line value"
            );
            continue;
        };

        let value = match inline {
            Some(value) => Some(value.to_string()),
            None if name == SWITCH_FLAG => None,
            None => next_value(&mut iter),
        };

        match canonical(name, value.as_deref()) {
            Some(canonical) => out.push(canonical),
            None => warn!(
                target: "diag_packager::startup",
                flag = name,
                value = value.as_deref().unwrap_or(""),
                "Ignoring unknown command line flag"
            ),
        }
    }
    out
}

/// `-x`, `--x`, `-x:v` and `-x=v` split into name and inline value.
fn split_flag(text: &str) -> Option<(&str, Option<&str>)> {
    if !looks_like_flag(text) {
        return None;
    }
    let body = text
        .strip_prefix("--")
        .unwrap_or_else(|| &text[1..]);
    Some(match body.find(|c: char| c == ':' || c == '=') {
        Some(index) => (&body[..index], Some(&body[index + 1..])),
        None => (body, None),
    })
}

/// A dash followed by something other than a digit; `-5` is a value.
fn looks_like_flag(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some('-')
        && chars
            .next()
            .map(|c| !c.is_ascii_digit())
            .unwrap_or(false)
}

fn next_value<I>(iter: &mut Peekable<I>) -> Option<String>
where
    I: Iterator<Item = OsString>,
{
    let candidate = iter.peek()?.to_str()?;
    if looks_like_flag(candidate) {
        return None;
    }
    let value = candidate.to_string();
    iter.next();
    Some(value)
}

fn canonical(name: &str, value: Option<&str>) -> Option<OsString> {
    if name == SWITCH_FLAG {
        return Some(OsString::from("-s"));
    }
    if LONG_FLAGS.contains(&name) {
        return Some(OsString::from(match value {
            Some(value) => format!("--{name}={value}"),
            None => format!("--{name}"),
        }));
    }
    if SHORT_FLAGS.contains(&name) {
        // Attached values keep a leading dash from being read as a flag.
        return Some(OsString::from(match value.filter(|value| !value.is_empty()) {
            Some(value) => format!("-{name}{value}"),
            None => format!("-{name}"),
        }));
    }
    None
}
