//! Delegation records and their lifecycle.

use std::fmt;

use bitcoin::{Amount, OutPoint, TxOut, Txid, XOnlyPublicKey};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use strata_btcstaking::{RawBitcoinTx, StakingInfo, StakingScriptError, tx::tx_output};
use strata_crypto::{AdaptorSignature, EvenPublicKey, SchnorrSig};
use strata_params::{ParamsVersion, StakingParams};
use tracing::debug;

use crate::{
    covenant::CovenantSigSet,
    errors::{CovenantSigError, StateTransitionError},
};

/// Lifecycle position of a delegation. Records only ever move forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub enum DelegationStatus {
    /// Waiting for a covenant quorum on the staking slashing path.
    Pending,
    /// Covenant quorum reached; the stake counts.
    Active,
    /// The staker opened an undelegation that waits for its own quorum.
    UnbondingRequested,
    /// The unbonding transaction is fully authorized.
    UnbondingActive,
    /// The unbonding transaction is confirmed on Bitcoin.
    Unbonded,
    /// A slashing transaction is confirmed on Bitcoin.
    Slashed,
}

impl DelegationStatus {
    pub fn can_transition_to(self, next: DelegationStatus) -> bool {
        use DelegationStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Active, UnbondingRequested)
                | (UnbondingRequested, UnbondingActive)
                | (UnbondingActive, Unbonded)
                | (Active, Slashed)
                | (UnbondingActive, Slashed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DelegationStatus::Unbonded | DelegationStatus::Slashed)
    }
}

impl fmt::Display for DelegationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DelegationStatus::Pending => "pending",
            DelegationStatus::Active => "active",
            DelegationStatus::UnbondingRequested => "unbonding-requested",
            DelegationStatus::UnbondingActive => "unbonding-active",
            DelegationStatus::Unbonded => "unbonded",
            DelegationStatus::Slashed => "slashed",
        };
        f.write_str(s)
    }
}

/// Validated inputs of a new delegation.
#[derive(Debug, Clone)]
pub struct DelegationInit {
    pub staker_pk: EvenPublicKey,
    pub validator_pks: Vec<EvenPublicKey>,
    pub staking_tx: RawBitcoinTx,
    pub staking_output_index: u32,
    pub total_sat: u64,
    pub staking_time: u16,
    pub start_height: u64,
    pub params_version: ParamsVersion,
    pub slashing_tx: RawBitcoinTx,
    pub delegator_slashing_sig: SchnorrSig,
}

/// One stake, identified by its staking transaction.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Delegation {
    staker_pk: EvenPublicKey,

    /// In the order the staker listed them. Adaptor signatures follow this order.
    validator_pks: Vec<EvenPublicKey>,

    staking_tx: RawBitcoinTx,
    staking_output_index: u32,
    total_sat: u64,

    /// Relative timelock of the staking output, in blocks.
    staking_time: u16,
    start_height: u64,
    end_height: u64,

    /// Params the record was created under. Covenant membership and quorum for all paths of the
    /// record come from here.
    params_version: ParamsVersion,

    /// Spends the staking output through its slashing path.
    slashing_tx: RawBitcoinTx,
    delegator_slashing_sig: SchnorrSig,

    /// One adaptor signature per validator, from each covenant member.
    covenant_sigs: CovenantSigSet<Vec<AdaptorSignature>>,

    undelegation: Option<Undelegation>,
    status: DelegationStatus,
}

impl Delegation {
    pub fn new(init: DelegationInit) -> Self {
        Self {
            staker_pk: init.staker_pk,
            validator_pks: init.validator_pks,
            staking_tx: init.staking_tx,
            staking_output_index: init.staking_output_index,
            total_sat: init.total_sat,
            staking_time: init.staking_time,
            start_height: init.start_height,
            end_height: init.start_height + u64::from(init.staking_time),
            params_version: init.params_version,
            slashing_tx: init.slashing_tx,
            delegator_slashing_sig: init.delegator_slashing_sig,
            covenant_sigs: CovenantSigSet::new(),
            undelegation: None,
            status: DelegationStatus::Pending,
        }
    }

    pub fn staker_pk(&self) -> &EvenPublicKey {
        &self.staker_pk
    }

    pub fn validator_pks(&self) -> &[EvenPublicKey] {
        &self.validator_pks
    }

    pub fn validator_x_only_pks(&self) -> Vec<XOnlyPublicKey> {
        self.validator_pks.iter().map(|pk| pk.x_only()).collect()
    }

    /// Position of `pk` in the delegation's validator list.
    pub fn validator_index(&self, pk: &EvenPublicKey) -> Option<usize> {
        self.validator_pks.iter().position(|v| v == pk)
    }

    pub fn staking_tx(&self) -> &RawBitcoinTx {
        &self.staking_tx
    }

    pub fn staking_txid(&self) -> Result<Txid, StateTransitionError> {
        Ok(self.staking_tx.txid()?)
    }

    pub fn staking_outpoint(&self) -> Result<OutPoint, StateTransitionError> {
        Ok(OutPoint::new(self.staking_txid()?, self.staking_output_index))
    }

    pub fn staking_output_index(&self) -> u32 {
        self.staking_output_index
    }

    pub fn total_sat(&self) -> u64 {
        self.total_sat
    }

    pub fn total_amount(&self) -> Amount {
        Amount::from_sat(self.total_sat)
    }

    pub fn staking_time(&self) -> u16 {
        self.staking_time
    }

    pub fn start_height(&self) -> u64 {
        self.start_height
    }

    /// Height at which the staking timelock expires.
    pub fn end_height(&self) -> u64 {
        self.end_height
    }

    pub fn params_version(&self) -> ParamsVersion {
        self.params_version
    }

    pub fn slashing_tx(&self) -> &RawBitcoinTx {
        &self.slashing_tx
    }

    pub fn delegator_slashing_sig(&self) -> &SchnorrSig {
        &self.delegator_slashing_sig
    }

    pub fn covenant_sigs(&self) -> &CovenantSigSet<Vec<AdaptorSignature>> {
        &self.covenant_sigs
    }

    pub fn undelegation(&self) -> Option<&Undelegation> {
        self.undelegation.as_ref()
    }

    pub fn status(&self) -> DelegationStatus {
        self.status
    }

    /// Rebuilds the staking output's script family under the pinned `params`.
    pub fn staking_info(&self, params: &StakingParams) -> Result<StakingInfo, StakingScriptError> {
        let covenants: Vec<_> = params.covenant_x_only_pks().collect();
        StakingInfo::from_keys(
            self.staker_pk.x_only(),
            &self.validator_x_only_pks(),
            &covenants,
            params.covenant_quorum,
            self.staking_time,
            self.total_amount(),
        )
    }

    /// Rebuilds the unbonding output's script family under the pinned `params`.
    pub fn unbonding_info(
        &self,
        params: &StakingParams,
    ) -> Result<StakingInfo, StateTransitionError> {
        let undelegation = self
            .undelegation
            .as_ref()
            .ok_or(StateTransitionError::MissingUndelegation)?;
        let unbonding_output = undelegation.unbonding_output()?;
        let covenants: Vec<_> = params.covenant_x_only_pks().collect();
        Ok(StakingInfo::from_keys(
            self.staker_pk.x_only(),
            &self.validator_x_only_pks(),
            &covenants,
            params.covenant_quorum,
            undelegation.unbonding_time,
            unbonding_output.value,
        )?)
    }

    /// Records covenant member `pk`'s adaptor signatures over the staking slashing transaction.
    ///
    /// `sigs` must hold one signature per validator, in the delegation's validator order. The
    /// caller verifies them. Reaching quorum activates a pending delegation.
    pub fn add_covenant_sigs(
        &mut self,
        params: &StakingParams,
        pk: EvenPublicKey,
        sigs: Vec<AdaptorSignature>,
    ) -> Result<DelegationStatus, StateTransitionError> {
        self.check_covenant_sigs(params, &pk, sigs.len())?;
        self.covenant_sigs.submit(params, pk, sigs)?;
        debug!(
            covenant = %pk.x_only(),
            count = self.covenant_sigs.count(),
            quorum = params.covenant_quorum,
            "accepted covenant slashing signatures"
        );

        if self.status == DelegationStatus::Pending && self.covenant_sigs.has_quorum(params) {
            self.transition(DelegationStatus::Active)?;
        }
        Ok(self.status)
    }

    /// Checks that [`Self::add_covenant_sigs`] would accept `count` signatures from `pk`.
    pub fn check_covenant_sigs(
        &self,
        params: &StakingParams,
        pk: &EvenPublicKey,
        count: usize,
    ) -> Result<(), StateTransitionError> {
        if !matches!(
            self.status,
            DelegationStatus::Pending | DelegationStatus::Active
        ) {
            return Err(StateTransitionError::NotAcceptingSignatures(self.status));
        }
        self.covenant_sigs.check_submission(params, pk)?;
        self.check_sig_count(count)?;
        Ok(())
    }

    /// Attaches a validated undelegation to an active delegation.
    pub fn begin_unbonding(
        &mut self,
        undelegation: Undelegation,
    ) -> Result<(), StateTransitionError> {
        if self.undelegation.is_some() {
            return Err(StateTransitionError::UndelegationExists);
        }
        self.ensure_transition(DelegationStatus::UnbondingRequested)?;
        self.undelegation = Some(undelegation);
        self.transition(DelegationStatus::UnbondingRequested)
    }

    /// Records covenant member `pk`'s signatures on the undelegation: a plain signature over the
    /// unbonding transaction and one adaptor signature per validator over the unbonding
    /// slashing transaction.
    ///
    /// Both are stored or neither is. Reaching quorum makes the unbonding active.
    pub fn add_covenant_unbonding_sigs(
        &mut self,
        params: &StakingParams,
        pk: EvenPublicKey,
        unbonding_sig: SchnorrSig,
        slashing_sigs: Vec<AdaptorSignature>,
    ) -> Result<DelegationStatus, StateTransitionError> {
        self.check_covenant_unbonding_sigs(params, &pk, slashing_sigs.len())?;

        let undelegation = self
            .undelegation
            .as_mut()
            .ok_or(StateTransitionError::MissingUndelegation)?;
        undelegation
            .covenant_unbonding_sigs
            .submit(params, pk, unbonding_sig)?;
        undelegation
            .covenant_slashing_sigs
            .submit(params, pk, slashing_sigs)?;
        let reached = undelegation.covenant_slashing_sigs.has_quorum(params);
        debug!(
            covenant = %pk.x_only(),
            count = undelegation.covenant_slashing_sigs.count(),
            quorum = params.covenant_quorum,
            "accepted covenant unbonding signatures"
        );

        if self.status == DelegationStatus::UnbondingRequested && reached {
            self.transition(DelegationStatus::UnbondingActive)?;
        }
        Ok(self.status)
    }

    /// Checks that [`Self::add_covenant_unbonding_sigs`] would accept a submission from `pk`
    /// carrying `slashing_count` adaptor signatures.
    pub fn check_covenant_unbonding_sigs(
        &self,
        params: &StakingParams,
        pk: &EvenPublicKey,
        slashing_count: usize,
    ) -> Result<(), StateTransitionError> {
        if !matches!(
            self.status,
            DelegationStatus::UnbondingRequested | DelegationStatus::UnbondingActive
        ) {
            return Err(StateTransitionError::NotAcceptingSignatures(self.status));
        }
        let undelegation = self
            .undelegation
            .as_ref()
            .ok_or(StateTransitionError::MissingUndelegation)?;
        undelegation
            .covenant_unbonding_sigs
            .check_submission(params, pk)?;
        undelegation
            .covenant_slashing_sigs
            .check_submission(params, pk)?;
        self.check_sig_count(slashing_count)?;
        Ok(())
    }

    /// Marks the delegation unbonded once its unbonding transaction is confirmed.
    pub fn confirm_unbonded(&mut self, params: &StakingParams) -> Result<(), StateTransitionError> {
        self.ensure_transition(DelegationStatus::Unbonded)?;
        let undelegation = self
            .undelegation
            .as_ref()
            .ok_or(StateTransitionError::MissingUndelegation)?;
        let unbonding_sigs = &undelegation.covenant_unbonding_sigs;
        if !unbonding_sigs.has_quorum(params) {
            return Err(CovenantSigError::QuorumNotReached {
                have: unbonding_sigs.count(),
                need: params.covenant_quorum as usize,
            }
            .into());
        }
        self.transition(DelegationStatus::Unbonded)
    }

    /// Marks the delegation slashed once a slashing transaction is confirmed.
    pub fn mark_slashed(&mut self) -> Result<(), StateTransitionError> {
        self.transition(DelegationStatus::Slashed)
    }

    fn check_sig_count(&self, got: usize) -> Result<(), CovenantSigError> {
        if got != self.validator_pks.len() {
            return Err(CovenantSigError::WrongSignatureCount {
                expected: self.validator_pks.len(),
                got,
            });
        }
        Ok(())
    }

    fn ensure_transition(&self, next: DelegationStatus) -> Result<(), StateTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: DelegationStatus) -> Result<(), StateTransitionError> {
        self.ensure_transition(next)?;
        debug!(from = %self.status, to = %next, "delegation status changed");
        self.status = next;
        Ok(())
    }
}

/// A staker's early exit from an active delegation.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Undelegation {
    /// Spends the staking output through its unbonding path.
    unbonding_tx: RawBitcoinTx,

    /// Relative timelock of the unbonding output, in blocks.
    unbonding_time: u16,

    /// Params current when the undelegation was opened. Governs the economics of
    /// `slashing_tx`; covenant membership stays with the delegation's version.
    params_version: ParamsVersion,

    /// Spends the unbonding output through its slashing path.
    slashing_tx: RawBitcoinTx,
    delegator_slashing_sig: SchnorrSig,

    covenant_slashing_sigs: CovenantSigSet<Vec<AdaptorSignature>>,
    covenant_unbonding_sigs: CovenantSigSet<SchnorrSig>,
}

impl Undelegation {
    pub fn new(
        unbonding_tx: RawBitcoinTx,
        unbonding_time: u16,
        params_version: ParamsVersion,
        slashing_tx: RawBitcoinTx,
        delegator_slashing_sig: SchnorrSig,
    ) -> Self {
        Self {
            unbonding_tx,
            unbonding_time,
            params_version,
            slashing_tx,
            delegator_slashing_sig,
            covenant_slashing_sigs: CovenantSigSet::new(),
            covenant_unbonding_sigs: CovenantSigSet::new(),
        }
    }

    pub fn unbonding_tx(&self) -> &RawBitcoinTx {
        &self.unbonding_tx
    }

    pub fn unbonding_txid(&self) -> Result<Txid, StateTransitionError> {
        Ok(self.unbonding_tx.txid()?)
    }

    /// The unbonding output, always output 0 of the unbonding transaction.
    pub fn unbonding_output(&self) -> Result<TxOut, StateTransitionError> {
        let tx = self.unbonding_tx.to_tx()?;
        Ok(tx_output(&tx, 0)?.clone())
    }

    pub fn unbonding_time(&self) -> u16 {
        self.unbonding_time
    }

    pub fn params_version(&self) -> ParamsVersion {
        self.params_version
    }

    pub fn slashing_tx(&self) -> &RawBitcoinTx {
        &self.slashing_tx
    }

    pub fn delegator_slashing_sig(&self) -> &SchnorrSig {
        &self.delegator_slashing_sig
    }

    pub fn covenant_slashing_sigs(&self) -> &CovenantSigSet<Vec<AdaptorSignature>> {
        &self.covenant_slashing_sigs
    }

    pub fn covenant_unbonding_sigs(&self) -> &CovenantSigSet<SchnorrSig> {
        &self.covenant_unbonding_sigs
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{
        ScriptBuf, Sequence, Transaction, TxIn, Witness, absolute::LockTime, hashes::Hash,
        transaction::Version,
    };
    use secp256k1::{PublicKey, SECP256K1, SecretKey};
    use strata_crypto::{EncryptionKey, schnorr::sign_schnorr_sig};
    use strata_params::Rate;

    use super::*;

    fn sk(byte: u8) -> SecretKey {
        SecretKey::from_slice(&[byte; 32]).unwrap()
    }

    fn pk(byte: u8) -> EvenPublicKey {
        PublicKey::from_secret_key(SECP256K1, &sk(byte)).into()
    }

    fn params(members: &[u8], quorum: u32) -> StakingParams {
        StakingParams {
            covenant_pks: members.iter().map(|b| pk(*b)).collect(),
            covenant_quorum: quorum,
            slashing_pk_script: ScriptBuf::from_bytes(vec![0x51]),
            slashing_rate: Rate::from_bps(1_000).unwrap(),
            min_slashing_tx_fee: Amount::from_sat(1_000),
            min_commission_rate: Rate::ZERO,
            max_active_validators: 100,
            max_unbonding_fee: Amount::from_sat(10_000),
        }
    }

    fn tx(seed: u8, value: u64) -> RawBitcoinTx {
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::new(Txid::from_byte_array([seed; 32]), 0),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(value),
                script_pubkey: ScriptBuf::from_bytes(vec![0x51]),
            }],
        }
        .into()
    }

    fn dummy_sig() -> SchnorrSig {
        sign_schnorr_sig(&[0; 32], &sk(1)).into()
    }

    fn adaptor_sigs(signer: u8, n: usize) -> Vec<AdaptorSignature> {
        let ek = EncryptionKey::from(pk(50).x_only());
        (0..n)
            .map(|i| AdaptorSignature::enc_sign(&[i as u8; 32], &sk(signer), &ek).unwrap())
            .collect()
    }

    fn delegation(validators: &[u8]) -> Delegation {
        Delegation::new(DelegationInit {
            staker_pk: pk(1),
            validator_pks: validators.iter().map(|b| pk(*b)).collect(),
            staking_tx: tx(1, 100_000),
            staking_output_index: 0,
            total_sat: 100_000,
            staking_time: 1_000,
            start_height: 500,
            params_version: ParamsVersion(0),
            slashing_tx: tx(2, 89_000),
            delegator_slashing_sig: dummy_sig(),
        })
    }

    fn undelegation() -> Undelegation {
        Undelegation::new(tx(3, 99_000), 100, ParamsVersion(0), tx(4, 88_000), dummy_sig())
    }

    fn active_with_undelegation(params: &StakingParams) -> Delegation {
        let mut del = delegation(&[2]);
        del.add_covenant_sigs(params, pk(10), adaptor_sigs(10, 1)).unwrap();
        del.begin_unbonding(undelegation()).unwrap();
        del
    }

    #[test]
    fn test_status_graph() {
        use DelegationStatus::*;
        let all = [Pending, Active, UnbondingRequested, UnbondingActive, Unbonded, Slashed];
        let allowed = [
            (Pending, Active),
            (Active, UnbondingRequested),
            (UnbondingRequested, UnbondingActive),
            (UnbondingActive, Unbonded),
            (Active, Slashed),
            (UnbondingActive, Slashed),
        ];
        for from in all {
            for to in all {
                assert_eq!(from.can_transition_to(to), allowed.contains(&(from, to)));
            }
        }
        assert!(Unbonded.is_terminal() && Slashed.is_terminal());
    }

    #[test]
    fn test_single_member_quorum_activates() {
        let params = params(&[10], 1);
        let mut del = delegation(&[2]);
        assert_eq!(del.end_height(), 1_500);

        let status = del
            .add_covenant_sigs(&params, pk(10), adaptor_sigs(10, 1))
            .unwrap();
        assert_eq!(status, DelegationStatus::Active);
        assert!(del.covenant_sigs().has_quorum(&params));
    }

    #[test]
    fn test_no_activation_below_quorum() {
        let params = params(&[10, 11, 12], 2);
        let mut del = delegation(&[2, 3]);

        del.add_covenant_sigs(&params, pk(10), adaptor_sigs(10, 2))
            .unwrap();
        assert_eq!(del.status(), DelegationStatus::Pending);

        let err = del
            .add_covenant_sigs(&params, pk(11), adaptor_sigs(11, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            StateTransitionError::CovenantSig(CovenantSigError::WrongSignatureCount {
                expected: 2,
                got: 1
            })
        ));
        assert_eq!(del.status(), DelegationStatus::Pending);

        let err = del
            .add_covenant_sigs(&params, pk(99), adaptor_sigs(99, 2))
            .unwrap_err();
        assert!(matches!(
            err,
            StateTransitionError::CovenantSig(CovenantSigError::NotCovenantMember(_))
        ));
        assert_eq!(del.covenant_sigs().count(), 1);
        assert_eq!(del.status(), DelegationStatus::Pending);

        del.add_covenant_sigs(&params, pk(12), adaptor_sigs(12, 2))
            .unwrap();
        assert_eq!(del.status(), DelegationStatus::Active);

        // Late signatures are still recorded but change nothing.
        del.add_covenant_sigs(&params, pk(11), adaptor_sigs(11, 2))
            .unwrap();
        assert_eq!(del.status(), DelegationStatus::Active);
        assert_eq!(del.covenant_sigs().count(), 3);
    }

    #[test]
    fn test_unbonding_requires_active() {
        let params = params(&[10], 1);
        let mut del = delegation(&[2]);
        assert!(matches!(
            del.begin_unbonding(undelegation()),
            Err(StateTransitionError::InvalidTransition {
                from: DelegationStatus::Pending,
                to: DelegationStatus::UnbondingRequested
            })
        ));
        assert!(del.undelegation().is_none());

        let mut del = active_with_undelegation(&params);
        assert_eq!(del.status(), DelegationStatus::UnbondingRequested);
        assert!(matches!(
            del.begin_unbonding(undelegation()),
            Err(StateTransitionError::UndelegationExists)
        ));
        assert!(matches!(
            del.add_covenant_sigs(&params, pk(10), adaptor_sigs(10, 1)),
            Err(StateTransitionError::NotAcceptingSignatures(
                DelegationStatus::UnbondingRequested
            ))
        ));
    }

    #[test]
    fn test_unbonding_sigs_are_atomic() {
        let params = params(&[10, 11], 2);
        let mut del = delegation(&[2]);
        del.add_covenant_sigs(&params, pk(10), adaptor_sigs(10, 1)).unwrap();
        del.add_covenant_sigs(&params, pk(11), adaptor_sigs(11, 1)).unwrap();
        del.begin_unbonding(undelegation()).unwrap();

        // A wrong slashing signature count stores neither signature.
        assert!(
            del.add_covenant_unbonding_sigs(&params, pk(10), dummy_sig(), vec![])
                .is_err()
        );
        let und = del.undelegation().unwrap();
        assert!(und.covenant_unbonding_sigs().is_empty());
        assert!(und.covenant_slashing_sigs().is_empty());

        let status = del
            .add_covenant_unbonding_sigs(&params, pk(10), dummy_sig(), adaptor_sigs(10, 1))
            .unwrap();
        assert_eq!(status, DelegationStatus::UnbondingRequested);
        assert!(matches!(
            del.confirm_unbonded(&params),
            Err(StateTransitionError::InvalidTransition { .. })
        ));

        assert!(matches!(
            del.add_covenant_unbonding_sigs(&params, pk(10), dummy_sig(), adaptor_sigs(10, 1)),
            Err(StateTransitionError::CovenantSig(
                CovenantSigError::DuplicateSignature(_)
            ))
        ));

        let status = del
            .add_covenant_unbonding_sigs(&params, pk(11), dummy_sig(), adaptor_sigs(11, 1))
            .unwrap();
        assert_eq!(status, DelegationStatus::UnbondingActive);

        del.confirm_unbonded(&params).unwrap();
        assert_eq!(del.status(), DelegationStatus::Unbonded);
        assert!(del.mark_slashed().is_err());
    }

    #[test]
    fn test_slashing_allowed_from_active_states_only() {
        let params = params(&[10], 1);
        let mut del = delegation(&[2]);
        assert!(del.mark_slashed().is_err());

        del.add_covenant_sigs(&params, pk(10), adaptor_sigs(10, 1)).unwrap();
        del.mark_slashed().unwrap();
        assert_eq!(del.status(), DelegationStatus::Slashed);

        let mut del = active_with_undelegation(&params);
        assert!(del.mark_slashed().is_err());
        del.add_covenant_unbonding_sigs(&params, pk(10), dummy_sig(), adaptor_sigs(10, 1))
            .unwrap();
        del.mark_slashed().unwrap();
    }

    #[test]
    fn test_record_encodings() {
        let params = params(&[10], 1);
        let del = active_with_undelegation(&params);

        let decoded: Delegation = borsh::from_slice(&borsh::to_vec(&del).unwrap()).unwrap();
        assert_eq!(decoded, del);

        let json = serde_json::to_string(&del).unwrap();
        let decoded: Delegation = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, del);
        assert_eq!(
            decoded.staking_txid().unwrap(),
            del.staking_tx().to_tx().unwrap().compute_txid()
        );
        assert_eq!(
            del.undelegation().unwrap().unbonding_output().unwrap().value,
            Amount::from_sat(99_000)
        );
    }
}
