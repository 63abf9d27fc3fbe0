//! Logging utilities.
//!
//! Engine code logs through the `log` facade only; `init_logging` installs
//! `env_logger` for binaries that want console output. Fatal conditions are logged
//! at `error` with a `FATAL:` prefix.

mod init;

pub use init::{init_logging, LoggingConfig};
