use std::fmt;

use bitcoin::{
    Amount, OutPoint, consensus::encode, sighash::TaprootError, taproot::TaprootBuilderError,
};
use strata_crypto::AdaptorError;
use thiserror::Error;

/// Which key list of a staking script a [`StakingScriptError::InvalidKeySet`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Validator,
    Covenant,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Validator => f.write_str("validator"),
            KeyRole::Covenant => f.write_str("covenant"),
        }
    }
}

/// Errors building the staking script family.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingScriptError {
    #[error("invalid {role} key set: {fault}")]
    InvalidKeySet { role: KeyRole, fault: KeySetFault },

    #[error("invalid quorum {quorum} for {size} keys")]
    InvalidQuorum { quorum: u32, size: usize },

    #[error("amount {amount} does not exceed the dust limit of the output script ({dust_limit})")]
    InvalidAmount { amount: Amount, dust_limit: Amount },

    #[error("relative timelock must be non-zero")]
    InvalidTimelock,

    #[error("taproot tree: {0}")]
    Taproot(#[from] TaprootBuilderError),

    #[error("taproot tree is incomplete")]
    IncompleteTree,
}

/// Why a key list was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeySetFault {
    #[error("empty")]
    Empty,

    #[error("contains duplicates")]
    Duplicate,

    #[error("contains the staker key")]
    ContainsStaker,
}

/// Rule of the slashing transaction shape that was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlashingTxFault {
    #[error("expected exactly one input, got {0}")]
    InputCount(usize),

    #[error("input spends {got}, expected {expected}")]
    WrongInput { expected: OutPoint, got: OutPoint },

    #[error("input sequence is not final")]
    NonFinalSequence,

    #[error("lock time must be zero")]
    NonZeroLockTime,

    #[error("expected exactly two outputs, got {0}")]
    OutputCount(usize),

    #[error("first output does not pay the slashing script")]
    WrongSlashingScript,

    #[error("second output does not pay the staker's change script")]
    WrongChangeScript,

    #[error("slashing output pays {got}, at least {expected} required")]
    SlashingAmountTooLow { expected: Amount, got: Amount },

    #[error("outputs exceed the funding amount")]
    OutputsExceedInput,

    #[error("fee {got} is below the minimum of {expected}")]
    FeeTooLow { expected: Amount, got: Amount },

    #[error("output {0} is dust")]
    DustOutput(usize),
}

/// Errors in transaction level checks, sighashes and signatures.
#[derive(Debug, Error)]
pub enum StakingTxError {
    #[error("invalid slashing tx: {0}")]
    InvalidSlashingTx(#[from] SlashingTxFault),

    #[error("transaction decode: {0}")]
    Decode(#[from] encode::Error),

    #[error("transaction bytes are not canonically encoded")]
    NonCanonicalEncoding,

    #[error("transaction has no output {0}")]
    MissingOutput(u32),

    #[error("transaction has no input {0}")]
    MissingInput(usize),

    #[error("sighash: {0}")]
    Sighash(#[from] TaprootError),

    #[error("leaf script is not part of the taproot tree")]
    UnknownLeaf,

    #[error("schnorr signature does not verify")]
    InvalidSignature,

    #[error("adaptor signature: {0}")]
    Adaptor(#[from] AdaptorError),

    #[error("script: {0}")]
    Script(#[from] StakingScriptError),
}

/// Failures verifying that a transaction is buried in a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InclusionError {
    #[error("header target is easier than the proof of work floor")]
    WorkBelowFloor,

    #[error("header hash does not meet its target")]
    InvalidPow,

    #[error("merkle branch does not lead to the header's merkle root")]
    MerkleRootMismatch,

    #[error("position {position} does not fit a branch of depth {depth}")]
    PositionOutOfRange { position: u32, depth: usize },
}
