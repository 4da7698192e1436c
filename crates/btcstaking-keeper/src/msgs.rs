//! Requests accepted by the keeper.
//!
//! Each request maps to exactly one keeper operation; [`StakingMsg`] closes the set so
//! dispatch is a plain `match`.

use bitcoin::{BlockHash, Txid};
use serde::{Deserialize, Serialize};
use strata_btcstaking::InclusionProof;
use strata_btcstaking_state::{DelegationStatus, Validator};
use strata_crypto::{AdaptorSignature, EvenPublicKey, SchnorrSig};

/// Proof that a transaction is buried in the block `block_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionEvidence {
    pub block_hash: BlockHash,
    pub proof: InclusionProof,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRegisterValidator {
    pub validator: Validator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateDelegation {
    pub staker_pk: EvenPublicKey,
    pub validator_pks: Vec<EvenPublicKey>,

    /// Consensus encoded staking transaction.
    pub staking_tx: Vec<u8>,
    pub staking_output_index: u32,
    pub staking_time: u16,
    pub staking_value: u64,

    /// Timelock on the slashing transaction's change output.
    pub unbonding_time: u16,
    pub inclusion: InclusionEvidence,

    /// Consensus encoded slashing transaction spending the staking output.
    pub slashing_tx: Vec<u8>,
    pub delegator_slashing_sig: SchnorrSig,
}

/// A covenant member's adaptor signatures over a delegation's slashing transaction, one per
/// validator in the delegation's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddCovenantSigs {
    pub staking_txid: Txid,
    pub covenant_pk: EvenPublicKey,
    pub slashing_sigs: Vec<AdaptorSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUndelegate {
    pub staking_txid: Txid,

    /// Consensus encoded unbonding transaction.
    pub unbonding_tx: Vec<u8>,
    pub unbonding_time: u16,

    /// Consensus encoded slashing transaction spending the unbonding output.
    pub slashing_tx: Vec<u8>,
    pub delegator_slashing_sig: SchnorrSig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddCovenantUnbondingSigs {
    pub staking_txid: Txid,
    pub covenant_pk: EvenPublicKey,
    pub unbonding_sig: SchnorrSig,
    pub slashing_sigs: Vec<AdaptorSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgConfirmUnbonded {
    pub staking_txid: Txid,

    /// Inclusion of the unbonding transaction.
    pub inclusion: InclusionEvidence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRecordSlashed {
    pub staking_txid: Txid,
    pub validator_pk: EvenPublicKey,

    /// Inclusion of the staking or unbonding slashing transaction.
    pub inclusion: InclusionEvidence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingMsg {
    RegisterValidator(MsgRegisterValidator),
    CreateDelegation(MsgCreateDelegation),
    AddCovenantSigs(MsgAddCovenantSigs),
    Undelegate(MsgUndelegate),
    AddCovenantUnbondingSigs(MsgAddCovenantUnbondingSigs),
    ConfirmUnbonded(MsgConfirmUnbonded),
    RecordSlashed(MsgRecordSlashed),
}

impl StakingMsg {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StakingMsg::RegisterValidator(_) => "register-validator",
            StakingMsg::CreateDelegation(_) => "create-delegation",
            StakingMsg::AddCovenantSigs(_) => "add-covenant-sigs",
            StakingMsg::Undelegate(_) => "undelegate",
            StakingMsg::AddCovenantUnbondingSigs(_) => "add-covenant-unbonding-sigs",
            StakingMsg::ConfirmUnbonded(_) => "confirm-unbonded",
            StakingMsg::RecordSlashed(_) => "record-slashed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingResponse {
    ValidatorRegistered(EvenPublicKey),
    DelegationCreated(Txid),
    /// Status of the delegation after the request was applied.
    Status(DelegationStatus),
}
