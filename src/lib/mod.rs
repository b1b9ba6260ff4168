//! Shared library modules providing error types, file utilities, process probing, and telemetry initialization.

pub mod errors;
pub mod fs;
pub mod process;
pub mod telemetry;
