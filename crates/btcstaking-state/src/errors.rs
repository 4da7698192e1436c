use bitcoin::XOnlyPublicKey;
use strata_btcstaking::{StakingScriptError, StakingTxError};
use strata_params::Rate;
use thiserror::Error;

use crate::delegation::DelegationStatus;

/// Rejections of a single covenant member's submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CovenantSigError {
    #[error("{0} is not a covenant committee member")]
    NotCovenantMember(XOnlyPublicKey),

    #[error("covenant member {0} already signed this path")]
    DuplicateSignature(XOnlyPublicKey),

    #[error("expected one adaptor signature per validator ({expected}), got {got}")]
    WrongSignatureCount { expected: usize, got: usize },

    #[error("covenant quorum not reached: {have} of {need}")]
    QuorumNotReached { have: usize, need: usize },
}

/// Rejections of a delegation lifecycle operation.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: DelegationStatus,
        to: DelegationStatus,
    },

    #[error("delegation in status {0} does not accept covenant signatures")]
    NotAcceptingSignatures(DelegationStatus),

    #[error("delegation has no undelegation")]
    MissingUndelegation,

    #[error("delegation already has an undelegation")]
    UndelegationExists,

    #[error("covenant signature: {0}")]
    CovenantSig(#[from] CovenantSigError),

    #[error("rebuilding scripts: {0}")]
    Script(#[from] StakingScriptError),

    #[error("stored transaction: {0}")]
    Tx(#[from] StakingTxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PopError {
    #[error("account key signature does not verify")]
    InvalidAccountSig,

    #[error("btc key signature does not verify")]
    InvalidBtcSig,
}

/// Rejections of a validator registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("proof of possession: {0}")]
    Pop(#[from] PopError),

    #[error("commission {got} is below the minimum of {min}")]
    CommissionTooLow { min: Rate, got: Rate },

    #[error("moniker must not be empty")]
    EmptyMoniker,

    #[error("description field {field} is {len} bytes, limit is {max}")]
    DescriptionTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}
