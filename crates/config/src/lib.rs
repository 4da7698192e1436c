//! Node configuration for the BTC staking keeper.

mod config;

pub use config::{Config, ConfigError, LoggingConfig, StakingConfig};
