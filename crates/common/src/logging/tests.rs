use std::{fs, path::PathBuf};

use strata_config::LoggingConfig;
use tracing::info;

use super::*;

#[test]
fn test_from_config_without_log_dir() {
    let config = LoggingConfig {
        log_dir: None,
        log_file_prefix: "staking".to_owned(),
        json_format: true,
    };
    let logger = LoggerConfig::from_config("keeper".to_owned(), &config);
    assert_eq!(logger.service_name, "keeper");
    assert!(logger.stdout_config.json_format);
    assert!(logger.file_logging_config.is_none());
}

#[test]
fn test_from_config_with_log_dir() {
    let config = LoggingConfig {
        log_dir: Some(PathBuf::from("/var/log/staking")),
        log_file_prefix: "staking".to_owned(),
        json_format: false,
    };
    let logger = LoggerConfig::from_config("keeper".to_owned(), &config);
    let file = logger.file_logging_config.unwrap();
    assert_eq!(file.directory, PathBuf::from("/var/log/staking"));
    assert_eq!(file.file_name_prefix, "staking");
    assert_eq!(file.rotation, Rotation::DAILY);
    assert!(!file.json_format);
}

// The global subscriber can only be installed once, so this is the only test calling `init`.
#[test]
fn test_init_writes_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoggerConfig::default().with_file_logging(
        FileLoggingConfig::new(dir.path().to_path_buf(), "test".to_owned())
            .with_rotation(Rotation::NEVER),
    );
    init(config);
    info!("hello from the logging test");

    let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
}
