//! Logging utilities.
//!
//! The engine only emits through the `log` facade. Hosts that want output call
//! [`init_logging`] once early; library code never installs a logger on its own.

mod init;

pub use init::{init_logging, LoggingConfig};
