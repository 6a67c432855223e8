//! Runtime support: layered application configuration and logging
//! bootstrap for servers built on the gate.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, LoggingConfig, ServerConfig};
pub use logging::{init_default_logging, init_logging};
