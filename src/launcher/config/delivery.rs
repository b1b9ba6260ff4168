use std::path::Path;

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_HUB_HOST: &str = "hub.gibraltarsoftware.com";
pub const DEFAULT_MAIL_SERVER: &str = "localhost";
pub const DEFAULT_MAIL_PORT: u16 = 25;
pub const DEFAULT_MAIL_SUBJECT: &str = "Diagnostic package";

/// Hosted hub used by customer-only server sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSection {
    pub default_host: String,
    pub use_ssl: bool,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            default_host: DEFAULT_HUB_HOST.to_string(),
            use_ssl: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawHubSection {
    pub default_host: Option<String>,
    pub use_ssl: Option<bool>,
}

/// Mail transport used when `-server` is not given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSection {
    pub default_server: String,
    pub default_port: u16,
    pub subject: String,
}

impl Default for EmailSection {
    fn default() -> Self {
        Self {
            default_server: DEFAULT_MAIL_SERVER.to_string(),
            default_port: DEFAULT_MAIL_PORT,
            subject: DEFAULT_MAIL_SUBJECT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawEmailSection {
    pub default_server: Option<String>,
    pub default_port: Option<u16>,
    pub subject: Option<String>,
}

pub fn parse_hub_section(raw: Option<RawHubSection>, path: &Path) -> Result<HubSection, ConfigError> {
    let raw = raw.unwrap_or_default();
    let defaults = HubSection::default();
    let default_host = raw.default_host.unwrap_or(defaults.default_host);
    validate_host(&default_host, "hub.default_host", path)?;
    Ok(HubSection {
        default_host,
        use_ssl: raw.use_ssl.unwrap_or(defaults.use_ssl),
    })
}

pub fn parse_email_section(
    raw: Option<RawEmailSection>,
    path: &Path,
) -> Result<EmailSection, ConfigError> {
    let raw = raw.unwrap_or_default();
    let defaults = EmailSection::default();
    let default_server = raw.default_server.unwrap_or(defaults.default_server);
    validate_host(&default_server, "email.default_server", path)?;

    let default_port = raw.default_port.unwrap_or(defaults.default_port);
    if default_port == 0 {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "email.default_port",
            message: "Use a port in the range 1-65535".into(),
        });
    }

    Ok(EmailSection {
        default_server,
        default_port,
        subject: raw
            .subject
            .filter(|subject| !subject.trim().is_empty())
            .unwrap_or(defaults.subject),
    })
}

fn validate_host(host: &str, field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if host.trim().is_empty() || host.contains(char::is_whitespace) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Use a host name without whitespace".into(),
        });
    }
    Ok(())
}
