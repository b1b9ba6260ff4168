//! Startup orchestration: configuration, process wait, mode dispatch, and exit reporting.
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod exit;
pub mod presenter;
pub mod runtime;
pub mod wait;

pub use channel::{resolve, TransmissionChannel, TransmissionRequest, TransmitMode};
pub use dispatch::{ModeDispatcher, PackagerFault};
pub use exit::{report, LauncherExit};
pub use presenter::{Presenter, TerminalPresenter};
pub use runtime::{run_launcher, Launcher};
pub use wait::{await_if_requested, WaitOutcome};
