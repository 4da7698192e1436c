//! Logging subsystem.

mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use manager::init;
pub use tracing_appender::rolling::Rotation;
pub use types::{FileLoggingConfig, LoggerConfig, StdoutConfig};
