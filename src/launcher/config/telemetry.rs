use std::path::Path;

use tracing::{debug, info};

use super::PackagerConfig;

pub fn log_missing(path: &Path) {
    debug!(
        target: "diag_packager::config",
        path = %path.display(),
        "No configuration file found; relying on command line only"
    );
}

pub fn log_loaded(config: &PackagerConfig) {
    info!(
        target: "diag_packager::config",
        path = %config.source_path.display(),
        product_name = config.packager.product_name.as_deref().unwrap_or(""),
        application_name = config.packager.application_name.as_deref().unwrap_or(""),
        sessions_root = ?config.sessions.root,
        hub_host = %config.hub.default_host,
        mail_server = %config.email.default_server,
        "Configuration file loaded successfully"
    );
}
