//! Bounded wait on a monitored process before dispatching.
use std::time::{Duration, Instant};

use tokio::time;
use tracing::{debug, info};

use crate::{cli::WaitSpec, lib::process::is_process_running};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What happened while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    pub waited: bool,
    pub exited: bool,
}

impl WaitOutcome {
    pub const NOT_REQUESTED: Self = Self {
        waited: false,
        exited: false,
    };
}

/// Block until the monitored process exits or the timeout elapses. Neither
/// outcome fails the run.
pub async fn await_if_requested(request: Option<WaitSpec>) -> WaitOutcome {
    let Some(request) = request else {
        return WaitOutcome::NOT_REQUESTED;
    };

    if !is_process_running(request.pid) {
        debug!(
            target: "diag_packager::wait",
            pid = request.pid,
            "Unable to find the process to wait on; treating it as exited"
        );
        return finish(request, true);
    }

    info!(
        target: "diag_packager::wait",
        pid = request.pid,
        timeout_ms = request.timeout.as_millis() as u64,
        "Waiting on calling process to exit"
    );
    let started = Instant::now();
    let exited = time::timeout(request.timeout, poll_until_exit(request.pid))
        .await
        .is_ok();
    debug!(
        target: "diag_packager::wait",
        pid = request.pid,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Wait on process complete"
    );
    finish(request, exited)
}

async fn poll_until_exit(pid: i32) {
    while is_process_running(pid) {
        time::sleep(POLL_INTERVAL).await;
    }
}

fn finish(request: WaitSpec, exited: bool) -> WaitOutcome {
    if exited {
        info!(
            target: "diag_packager::wait",
            pid = request.pid,
            "The process we were waiting on is no longer running so the packager can continue"
        );
    } else {
        info!(
            target: "diag_packager::wait",
            pid = request.pid,
            "The process we were waiting on is still running but the wait limit was reached; packaging anyway"
        );
    }
    WaitOutcome {
        waited: true,
        exited,
    }
}
