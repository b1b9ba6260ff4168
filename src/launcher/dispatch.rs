//! Interactive/silent decision and silent-mode channel dispatch.
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, error, info};

use super::{
    channel::{self, TransmissionRequest},
    exit::LauncherExit,
    presenter::Presenter,
    wait::WaitOutcome,
};
use crate::{
    cli::{Arguments, EffectiveConfig, RunMode},
    lib::errors::{PackagerError, ValidationError},
    packager::{PackageReceipt, PackagerFactory},
};

/// Anything that went wrong inside the packaging collaborator.
#[derive(Debug, Error)]
pub enum PackagerFault {
    #[error(transparent)]
    Failed(#[from] PackagerError),
    #[error("packaging collaborator panicked: {0}")]
    Panicked(String),
    #[error("packaging task was cancelled")]
    Cancelled,
}

/// Terminal `MissingProductName` when the effective product name is empty.
pub fn require_product_name(config: &EffectiveConfig) -> Result<(), LauncherExit> {
    if config.product_name().is_some() {
        return Ok(());
    }
    error!(
        target: "diag_packager::dispatch",
        "There is no product name specified in the configuration so the packager can't start"
    );
    Err(LauncherExit::MissingProductName)
}

/// Acquire a packager, run one transmission, and release it on every path.
/// Errors and panics from the collaborator come back as [`PackagerFault`].
pub async fn transmit(
    factory: &dyn PackagerFactory,
    config: &EffectiveConfig,
    request: TransmissionRequest,
) -> Result<PackageReceipt, PackagerFault> {
    let mut packager = panic::catch_unwind(AssertUnwindSafe(|| factory.open(config)))
        .map_err(|payload| PackagerFault::Panicked(panic_message(payload.as_ref())))??;

    let task = tokio::spawn(async move {
        let result = packager.transmit(&request).await;
        drop(packager);
        result
    });

    match task.await {
        Ok(result) => Ok(result?),
        Err(err) if err.is_panic() => {
            Err(PackagerFault::Panicked(panic_message(err.into_panic().as_ref())))
        }
        Err(_) => Err(PackagerFault::Cancelled),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Top-level decision between the interactive shell and silent dispatch.
pub struct ModeDispatcher<'a> {
    factory: &'a dyn PackagerFactory,
    presenter: &'a dyn Presenter,
}

impl<'a> ModeDispatcher<'a> {
    pub fn new(factory: &'a dyn PackagerFactory, presenter: &'a dyn Presenter) -> Self {
        Self { factory, presenter }
    }

    /// Run the linear decision: identity check, mode, transmit mode, channel,
    /// collaborator. Every branch ends in exactly one exit.
    pub async fn run(
        &self,
        config: &EffectiveConfig,
        args: &Arguments,
        wait: WaitOutcome,
    ) -> LauncherExit {
        if let Err(exit) = require_product_name(config) {
            return exit;
        }

        let mode = RunMode::from_args(args);
        debug!(
            target: "diag_packager::dispatch",
            mode = mode.as_str(),
            waited = wait.waited,
            monitored_exited = wait.exited,
            "Dispatching packager run"
        );

        match mode {
            RunMode::Interactive => {
                self.presenter.run_interactive(config, self.factory).await;
                LauncherExit::Success
            }
            RunMode::Silent => self.run_silent(config, args).await,
        }
    }

    async fn run_silent(&self, config: &EffectiveConfig, args: &Arguments) -> LauncherExit {
        let Some(token) = args
            .transmit_mode
            .as_deref()
            .filter(|token| !token.is_empty())
        else {
            let err = ValidationError::MissingTransmitMode;
            error!(target: "diag_packager::dispatch", reason = %err, "Unable to process command line");
            return err.into();
        };

        let request = match channel::resolve(token, args) {
            Ok(request) => request,
            Err(err) => {
                error!(target: "diag_packager::dispatch", reason = %err, "Unable to process command line");
                return err.into();
            }
        };

        let mode = request.channel.mode();
        match transmit(self.factory, config, request).await {
            Ok(receipt) => {
                info!(
                    target: "diag_packager::dispatch",
                    mode = mode.as_str(),
                    package_id = %receipt.package_id,
                    sessions = receipt.session_count,
                    destination = %receipt.destination,
                    "Silent packaging completed"
                );
                LauncherExit::Success
            }
            Err(fault) => {
                error!(
                    target: "diag_packager::dispatch",
                    mode = mode.as_str(),
                    error = ?fault,
                    reason = %fault,
                    "Packaging failed"
                );
                LauncherExit::RuntimeException
            }
        }
    }
}
