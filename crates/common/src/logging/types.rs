//! Configuration types for the logging subsystem.

use std::path::PathBuf;

use strata_config::LoggingConfig;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

/// Configuration for the stdout logging layer
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    /// Use JSON format instead of compact format
    pub json_format: bool,
    /// Span events to log
    pub fmt_span: FmtSpan,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            fmt_span: FmtSpan::CLOSE,
        }
    }
}

/// Configuration for file-based logging with rotation
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    /// Directory where log files will be written
    pub directory: PathBuf,
    /// Base filename prefix
    pub file_name_prefix: String,
    pub rotation: Rotation,
    /// Use JSON format for file logs
    pub json_format: bool,
}

impl FileLoggingConfig {
    pub fn new(directory: PathBuf, file_name_prefix: String) -> Self {
        Self {
            directory,
            file_name_prefix,
            rotation: Rotation::DAILY,
            json_format: false,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_json_format(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }
}

/// Main logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Name reported in the startup line
    pub service_name: String,
    pub stdout_config: StdoutConfig,
    /// File logging configuration, disabled when unset
    pub file_logging_config: Option<FileLoggingConfig>,
}

impl LoggerConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            service_name,
            stdout_config: StdoutConfig::default(),
            file_logging_config: None,
        }
    }

    /// Enable JSON logging format
    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.stdout_config.json_format = enabled;
        self
    }

    /// Enable file logging with configuration
    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file_logging_config = Some(config);
        self
    }

    /// Builds the logger configuration described by the `[logging]` table of a config file.
    ///
    /// The JSON switch applies to both stdout and the file layer.
    pub fn from_config(service_name: String, config: &LoggingConfig) -> Self {
        let file = config.log_dir.as_ref().map(|dir| {
            FileLoggingConfig::new(dir.clone(), config.log_file_prefix.clone())
                .with_json_format(config.json_format)
        });

        Self {
            service_name,
            stdout_config: StdoutConfig {
                json_format: config.json_format,
                ..Default::default()
            },
            file_logging_config: file,
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new("btcstaking".to_owned())
    }
}
