//! Startup wiring: one launcher run from raw arguments to a single exit code.
use std::ffi::OsString;

use tracing::{error, Instrument};

use super::{
    config::PackagerConfig,
    dispatch::{require_product_name, ModeDispatcher},
    exit::{self, LauncherExit},
    presenter::Presenter,
    wait::await_if_requested,
};
use crate::{
    cli::{resolve_config, resolve_config_path, Arguments, RunMode, WaitSpec},
    lib::telemetry::LauncherSession,
    packager::{ArchivePackagerFactory, DeliverySettings, PackagerFactory},
};

/// Launcher bound to a presentation layer and, optionally, a packaging
/// collaborator other than the archive packager.
pub struct Launcher<'a> {
    presenter: &'a dyn Presenter,
    factory: Option<&'a dyn PackagerFactory>,
}

impl<'a> Launcher<'a> {
    pub fn new(presenter: &'a dyn Presenter) -> Self {
        Self {
            presenter,
            factory: None,
        }
    }

    pub fn with_factory(mut self, factory: &'a dyn PackagerFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Run once. The returned exit has already been reported to the user.
    pub async fn run<I, T>(&self, raw: I) -> LauncherExit
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let session = LauncherSession::start();
        let span = session.span().clone();
        let exit = self.run_session(raw).instrument(span).await;
        session.finish(exit.as_str(), exit.code());
        exit
    }

    async fn run_session<I, T>(&self, raw: I) -> LauncherExit
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = match Arguments::parse_raw(raw) {
            Ok(args) => args,
            Err(err) if err.is_informational() => {
                err.print();
                return LauncherExit::Success;
            }
            Err(err) => {
                error!(
                    target: "diag_packager::startup",
                    reason = %err,
                    "Unable to process command line; continuing without arguments"
                );
                Arguments::default()
            }
        };

        let mode = RunMode::from_args(&args);
        let exit = self.decide(&args).await;
        exit::report(exit, mode, self.presenter);
        exit
    }

    async fn decide(&self, args: &Arguments) -> LauncherExit {
        let configured = match load_configuration(args) {
            Ok(configured) => configured,
            Err(exit) => return exit,
        };

        let effective = resolve_config(args, configured.as_ref().map(|config| &config.packager));
        if let Err(exit) = require_product_name(&effective) {
            return exit;
        }

        let wait = await_if_requested(WaitSpec::from_args(args)).await;

        let archive_factory =
            ArchivePackagerFactory::new(DeliverySettings::from_config(configured.as_ref()));
        let factory = self.factory.unwrap_or(&archive_factory);
        ModeDispatcher::new(factory, self.presenter)
            .run(&effective, args, wait)
            .await
    }
}

/// Run the launcher with the archive packager and return the exit to use.
pub async fn run_launcher<I, T>(raw: I, presenter: &dyn Presenter) -> LauncherExit
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Launcher::new(presenter).run(raw).await
}

fn load_configuration(args: &Arguments) -> Result<Option<PackagerConfig>, LauncherExit> {
    let path = resolve_config_path(args.config_path.clone()).map_err(|err| {
        error!(
            target: "diag_packager::startup",
            reason = %err,
            "Unable to locate configuration file"
        );
        LauncherExit::BadConfigurationFile
    })?;
    PackagerConfig::load_from_path(path).map_err(|_| LauncherExit::BadConfigurationFile)
}
