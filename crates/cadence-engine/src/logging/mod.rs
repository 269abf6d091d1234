//! Logging setup.
//!
//! The crate logs through the `log` facade only; binaries pick the backend.
//! [`init_logging`] installs `env_logger` for those that have no preference.

mod init;

pub use init::{init_logging, LoggingConfig};
