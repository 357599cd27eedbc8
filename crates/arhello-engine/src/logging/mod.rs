//! Logging utilities.
//!
//! Everything in the engine logs through the `log` facade. This module only
//! owns backend initialization so the binary decides when it happens.

mod init;

pub use init::{LoggingConfig, init_logging};
