use bitcoin::{Amount, BlockHash, OutPoint, Txid, XOnlyPublicKey};
use strata_btcstaking::{InclusionError, SlashingTxFault, StakingScriptError, StakingTxError};
use strata_btcstaking_state::{CovenantSigError, StateTransitionError, ValidatorError};
use strata_params::ParamsVersion;
use thiserror::Error;

/// Broad class of a rejection, deciding how a caller should react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed keys, scripts, amounts or signatures.
    Validation,
    /// The signer or the record's state does not permit the operation.
    Authorization,
    /// The request collides with an existing record or submission.
    Conflict,
    /// A collaborator cannot confirm the request yet. Retrying later may succeed.
    ExternalDependency,
}

/// Failures of the record stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Shape rule of an unbonding transaction that was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnbondingTxFault {
    #[error("expected exactly one input, got {0}")]
    InputCount(usize),

    #[error("input spends {got}, expected the staking output {expected}")]
    WrongInput { expected: OutPoint, got: OutPoint },

    #[error("expected exactly one output, got {0}")]
    OutputCount(usize),

    #[error("unbonding output {unbonding} exceeds the staked {staked}")]
    OutputExceedsStake { staked: Amount, unbonding: Amount },

    #[error("fee {fee} is outside 1 sat..={max}")]
    FeeOutOfRange { fee: Amount, max: Amount },
}

/// Rejections of a staking request.
#[derive(Debug, Error)]
pub enum StakingError {
    #[error("validator registration: {0}")]
    InvalidValidator(#[from] ValidatorError),

    #[error("validator {0} is already registered")]
    DuplicateValidator(XOnlyPublicKey),

    #[error("validator {0} is not registered")]
    ValidatorNotFound(XOnlyPublicKey),

    #[error("validator {0} is not part of the delegation")]
    ValidatorNotInDelegation(XOnlyPublicKey),

    #[error("delegation lists {got} validators, at most {max} allowed")]
    TooManyValidators { max: usize, got: usize },

    #[error("delegation for staking tx {0} already exists")]
    DuplicateDelegation(Txid),

    #[error("no delegation for staking tx {0}")]
    DelegationNotFound(Txid),

    #[error("staking output does not match the script and value rebuilt from the request")]
    InvalidStakingTx,

    #[error("staking timelock leaves {remaining} blocks after the tip, need at least {required}")]
    StakingTimelockTooShort { remaining: u64, required: u64 },

    #[error("staking timelock expired at height {end_height}, tip is {tip}")]
    StakingExpired { end_height: u64, tip: u64 },

    #[error("invalid slashing tx: {0}")]
    InvalidSlashingTx(SlashingTxFault),

    #[error("staker slashing signature does not verify")]
    InvalidSlashingSignature,

    #[error("invalid unbonding tx: {0}")]
    InvalidUnbondingTx(#[from] UnbondingTxFault),

    #[error("unbonding output script does not match the rebuilt unbonding script")]
    InvalidUnbondingScript,

    #[error("unbonding time {got} must exceed {min} and not exceed the staking time {max}")]
    InvalidUnbondingTime { min: u64, max: u16, got: u16 },

    #[error("covenant unbonding signature does not verify")]
    InvalidUnbondingSignature,

    #[error("covenant adaptor signature for validator {index} does not verify")]
    InvalidAdaptorSignature { index: usize },

    #[error("covenant signature: {0}")]
    CovenantSig(CovenantSigError),

    #[error("delegation already has an undelegation")]
    UndelegationExists,

    #[error("delegation state: {0}")]
    State(StateTransitionError),

    #[error("script: {0}")]
    Script(#[from] StakingScriptError),

    #[error("transaction: {0}")]
    Tx(StakingTxError),

    #[error("block {0} is unknown to the light client")]
    HeaderNotFound(BlockHash),

    #[error("inclusion proof: {0}")]
    InvalidInclusionProof(#[from] InclusionError),

    #[error("transaction is {depth} blocks deep, need {required}")]
    InsufficientConfirmations { depth: u64, required: u64 },

    #[error("params version {0} is unknown")]
    ParamsNotFound(ParamsVersion),

    #[error("no params active at height {0}")]
    NoParamsAtHeight(u64),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

impl StakingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StakingError::InvalidValidator(ValidatorError::Pop(_))
            | StakingError::ValidatorNotInDelegation(_)
            | StakingError::State(_) => ErrorKind::Authorization,

            StakingError::CovenantSig(err) => match err {
                CovenantSigError::NotCovenantMember(_)
                | CovenantSigError::QuorumNotReached { .. } => ErrorKind::Authorization,
                CovenantSigError::DuplicateSignature(_) => ErrorKind::Conflict,
                CovenantSigError::WrongSignatureCount { .. } => ErrorKind::Validation,
            },

            StakingError::DuplicateValidator(_)
            | StakingError::DuplicateDelegation(_)
            | StakingError::UndelegationExists => ErrorKind::Conflict,

            StakingError::HeaderNotFound(_)
            | StakingError::InvalidInclusionProof(_)
            | StakingError::InsufficientConfirmations { .. }
            | StakingError::ParamsNotFound(_)
            | StakingError::NoParamsAtHeight(_)
            | StakingError::Store(_) => ErrorKind::ExternalDependency,

            StakingError::InvalidValidator(_)
            | StakingError::ValidatorNotFound(_)
            | StakingError::TooManyValidators { .. }
            | StakingError::DelegationNotFound(_)
            | StakingError::InvalidStakingTx
            | StakingError::StakingTimelockTooShort { .. }
            | StakingError::StakingExpired { .. }
            | StakingError::InvalidSlashingTx(_)
            | StakingError::InvalidSlashingSignature
            | StakingError::InvalidUnbondingTx(_)
            | StakingError::InvalidUnbondingScript
            | StakingError::InvalidUnbondingTime { .. }
            | StakingError::InvalidUnbondingSignature
            | StakingError::InvalidAdaptorSignature { .. }
            | StakingError::Script(_)
            | StakingError::Tx(_) => ErrorKind::Validation,
        }
    }

    /// Whether the same request may succeed once the chain or the stores move on.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ExternalDependency
    }
}

impl From<CovenantSigError> for StakingError {
    fn from(err: CovenantSigError) -> Self {
        StakingError::CovenantSig(err)
    }
}

impl From<StakingTxError> for StakingError {
    fn from(err: StakingTxError) -> Self {
        match err {
            StakingTxError::InvalidSlashingTx(fault) => StakingError::InvalidSlashingTx(fault),
            StakingTxError::Script(err) => StakingError::Script(err),
            other => StakingError::Tx(other),
        }
    }
}

impl From<StateTransitionError> for StakingError {
    fn from(err: StateTransitionError) -> Self {
        match err {
            StateTransitionError::CovenantSig(err) => StakingError::CovenantSig(err),
            StateTransitionError::Script(err) => StakingError::Script(err),
            StateTransitionError::Tx(err) => err.into(),
            StateTransitionError::UndelegationExists => StakingError::UndelegationExists,
            other => StakingError::State(other),
        }
    }
}
