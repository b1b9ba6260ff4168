//! Command-line surface: argument view and startup profile.

pub mod args;
pub mod profile;

pub use args::{normalize_raw_args, Arguments};
pub use profile::{
    resolve_config, resolve_config_path, EffectiveConfig, RunMode, WaitSpec, DEFAULT_WAIT_TIMEOUT,
};
