use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bitcoin::Network;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default value for `btc_confirmation_depth` in [`StakingConfig`].
const DEFAULT_BTC_CONFIRMATION_DEPTH: u64 = 6;

/// Default value for `checkpoint_finalization_timeout` in [`StakingConfig`].
const DEFAULT_CHECKPOINT_FINALIZATION_TIMEOUT: u64 = 20;

/// Default value for `max_validators_per_delegation` in [`StakingConfig`].
const DEFAULT_MAX_VALIDATORS_PER_DELEGATION: usize = 1;

/// Default value for `log_file_prefix` in [`LoggingConfig`].
const DEFAULT_LOG_FILE_PREFIX: &str = "btcstaking";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} must be non-zero")]
    ZeroValue(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Bitcoin network staking transactions live on.
    pub network: Network,

    /// Blocks a staking or unbonding transaction must be buried under before it is accepted.
    #[serde(default = "default_btc_confirmation_depth")]
    pub btc_confirmation_depth: u64,

    /// Blocks after which a checkpoint is considered final. Staking and unbonding timelocks must
    /// outlast it.
    #[serde(default = "default_checkpoint_finalization_timeout")]
    pub checkpoint_finalization_timeout: u64,

    /// Upper bound on the validators a single delegation may list.
    #[serde(default = "default_max_validators_per_delegation")]
    pub max_validators_per_delegation: usize,
}

impl StakingConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            btc_confirmation_depth: DEFAULT_BTC_CONFIRMATION_DEPTH,
            checkpoint_finalization_timeout: DEFAULT_CHECKPOINT_FINALIZATION_TIMEOUT,
            max_validators_per_delegation: DEFAULT_MAX_VALIDATORS_PER_DELEGATION,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.btc_confirmation_depth == 0 {
            return Err(ConfigError::ZeroValue("btc_confirmation_depth"));
        }
        if self.max_validators_per_delegation == 0 {
            return Err(ConfigError::ZeroValue("max_validators_per_delegation"));
        }
        Ok(())
    }
}

fn default_btc_confirmation_depth() -> u64 {
    DEFAULT_BTC_CONFIRMATION_DEPTH
}

fn default_checkpoint_finalization_timeout() -> u64 {
    DEFAULT_CHECKPOINT_FINALIZATION_TIMEOUT
}

fn default_max_validators_per_delegation() -> usize {
    DEFAULT_MAX_VALIDATORS_PER_DELEGATION
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rolling log files. File logging is off when unset.
    pub log_dir: Option<PathBuf>,

    /// File name prefix of the rolling log files.
    #[serde(default = "default_log_file_prefix")]
    pub log_file_prefix: String,

    /// Emit JSON instead of the compact format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_file_prefix() -> String {
    DEFAULT_LOG_FILE_PREFIX.to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub staking: StakingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.staking.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
