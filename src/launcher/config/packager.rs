use std::path::PathBuf;

use serde::Deserialize;

/// Product identity read from `[packager]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRecord {
    pub product_name: Option<String>,
    pub application_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawPackagerSection {
    pub product_name: Option<String>,
    pub application_name: Option<String>,
}

/// Where session files live when no `-folder` is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionsSection {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawSessionsSection {
    pub root: Option<PathBuf>,
}

pub fn parse_packager_section(raw: Option<RawPackagerSection>) -> ConfigRecord {
    let raw = raw.unwrap_or_default();
    ConfigRecord {
        product_name: raw.product_name,
        application_name: raw.application_name,
    }
}

pub fn parse_sessions_section(raw: Option<RawSessionsSection>) -> SessionsSection {
    let raw = raw.unwrap_or_default();
    SessionsSection {
        root: raw.root.filter(|root| !root.as_os_str().is_empty()),
    }
}
