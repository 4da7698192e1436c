use thiserror::Error;

use crate::ParamsVersion;

/// Reasons a staking parameter set is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("covenant committee is empty")]
    EmptyCovenantSet,

    #[error("duplicate covenant key in committee")]
    DuplicateCovenantKey,

    #[error("invalid covenant quorum {quorum} for committee of {size}")]
    InvalidQuorum { quorum: u32, size: usize },

    #[error("rate of {0} bps is out of range")]
    InvalidRate(u16),

    #[error("slashing rate must be strictly between 0 and 1")]
    InvalidSlashingRate,

    #[error("slashing script is empty")]
    EmptySlashingScript,

    #[error("max active validators must be non-zero")]
    ZeroMaxActiveValidators,

    #[error("activation height {got} is not above previous activation {prev}")]
    NonIncreasingActivation { prev: u64, got: u64 },

    #[error("unknown params version {0}")]
    UnknownVersion(ParamsVersion),

    #[error("no params active at height {0}")]
    NoneActiveAt(u64),
}
