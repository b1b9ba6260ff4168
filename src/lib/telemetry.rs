//! Telemetry initialization and launcher session markers.

use std::time::Instant;

use anyhow::Result;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Start/end markers around one launcher run.
pub struct LauncherSession {
    span: Span,
    started_at: Instant,
    session_id: Uuid,
}

impl LauncherSession {
    /// Open the session and record the start marker.
    pub fn start() -> Self {
        let session_id = Uuid::new_v4();
        let span = info_span!(
            target: "diag_packager::session",
            "packager_session",
            %session_id
        );
        {
            let _entered = span.enter();
            info!(
                target: "diag_packager::session",
                %session_id,
                version = env!("CARGO_PKG_VERSION"),
                "Packager application starting"
            );
        }
        Self {
            span,
            started_at: Instant::now(),
            session_id,
        }
    }

    /// Span that startup events should be recorded under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Close the session while recording the final exit code.
    pub fn finish(self, outcome: &'static str, exit_code: u8) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "diag_packager::session",
            session_id = %self.session_id,
            outcome,
            exit_code,
            elapsed_ms,
            "Packager session ended"
        );
    }
}
