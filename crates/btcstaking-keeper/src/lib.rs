//! Request handling for BTC staking.
//!
//! [`StakingKeeper`] validates staking requests against the Bitcoin light client, inclusion
//! proofs, versioned parameters and the record stores, and drives delegations through their
//! lifecycle. The collaborators are capability traits so hosts and tests can supply their own.

mod errors;
mod keeper;
mod mem;
mod msgs;
mod spv;
mod traits;

pub use errors::{ErrorKind, StakingError, StoreError, UnbondingTxFault};
pub use keeper::{SlashingTarget, StakingKeeper};
pub use mem::{MemDelegationStore, MemParamsStore, MemValidatorRegistry};
pub use msgs::{
    InclusionEvidence, MsgAddCovenantSigs, MsgAddCovenantUnbondingSigs, MsgConfirmUnbonded,
    MsgCreateDelegation, MsgRecordSlashed, MsgRegisterValidator, MsgUndelegate, StakingMsg,
    StakingResponse,
};
pub use spv::SpvVerifier;
#[cfg(any(test, feature = "test-utils"))]
pub use traits::{
    MockBtcLightClient, MockDelegationStore, MockInclusionVerifier, MockParamsStore,
    MockValidatorRegistry,
};
pub use traits::{
    BtcLightClient, DelegationStore, InclusionVerifier, ParamsStore, ValidatorRegistry,
};
