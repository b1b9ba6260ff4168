//! Load and validate packager configuration.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod delivery;
pub mod packager;
pub mod telemetry;

pub use delivery::{
    parse_email_section, parse_hub_section, EmailSection, HubSection, RawEmailSection,
    RawHubSection, DEFAULT_HUB_HOST, DEFAULT_MAIL_PORT, DEFAULT_MAIL_SERVER, DEFAULT_MAIL_SUBJECT,
};
pub use packager::{
    parse_packager_section, parse_sessions_section, ConfigRecord, RawPackagerSection,
    RawSessionsSection, SessionsSection,
};

/// Top-level configuration container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerConfig {
    pub packager: ConfigRecord,
    pub sessions: SessionsSection,
    pub hub: HubSection,
    pub email: EmailSection,
    pub source_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawPackagerConfig {
    packager: Option<RawPackagerSection>,
    sessions: Option<RawSessionsSection>,
    hub: Option<RawHubSection>,
    email: Option<RawEmailSection>,
}

impl PackagerConfig {
    /// Load configuration from a specific path. A missing file yields `None`.
    pub fn load_from_path(path: PathBuf) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            telemetry::log_missing(&path);
            return Ok(None);
        }

        info!(
            target: "diag_packager::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder().add_source(config::File::from(path.clone()));
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "diag_packager::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawPackagerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "diag_packager::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "diag_packager::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(Some(config))
    }

    fn from_raw(raw: RawPackagerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let packager = parse_packager_section(raw.packager);
        let sessions = parse_sessions_section(raw.sessions);
        let hub = parse_hub_section(raw.hub, &path)?;
        let email = parse_email_section(raw.email, &path)?;

        Ok(Self {
            packager,
            sessions,
            hub,
            email,
            source_path: path,
        })
    }
}
