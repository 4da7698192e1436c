//! Witnesses for the slashing and unbonding paths, assembled from stored signatures.

use std::collections::BTreeMap;

use bitcoin::{Txid, Witness};
use secp256k1::SecretKey;
use strata_btcstaking::{
    SpendPath, StakingTxError,
    sighash::{sign_spend, verify_spend_sig},
    witness::{slashing_witness, unbonding_witness},
};
use strata_btcstaking_state::{CovenantSigError, StateTransitionError};
use strata_crypto::{DecryptionKey, EvenSecretKey, SchnorrSig};

use super::StakingKeeper;
use crate::{
    errors::StakingError,
    traits::{BtcLightClient, DelegationStore, InclusionVerifier, ParamsStore, ValidatorRegistry},
};

/// Which slashing transaction of a delegation to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashingTarget {
    /// Spends the staking output.
    Staking,
    /// Spends the unbonding output.
    Unbonding,
}

impl<L, I, P, V, D> StakingKeeper<L, I, P, V, D>
where
    L: BtcLightClient,
    I: InclusionVerifier,
    P: ParamsStore,
    V: ValidatorRegistry,
    D: DelegationStore,
{
    /// Completes the witness of a slashing transaction once `validator_sk` has been revealed.
    ///
    /// The covenant adaptor signatures of the quorum subset are decrypted with the validator
    /// secret, which also signs for the validator. The key is only used for this call.
    pub fn build_slashing_witness(
        &self,
        staking_txid: &Txid,
        target: SlashingTarget,
        validator_sk: &SecretKey,
    ) -> Result<Witness, StakingError> {
        let delegation = self.get_delegation(staking_txid)?;
        let params = self.params_version(delegation.params_version())?.params;

        let validator_sk = EvenSecretKey::from(*validator_sk);
        let validator_pk = validator_sk.x_only();
        let index = delegation
            .validator_x_only_pks()
            .iter()
            .position(|pk| pk == &validator_pk)
            .ok_or(StakingError::ValidatorNotInDelegation(validator_pk))?;

        let (info, slashing_tx, staker_sig, covenant_sigs) = match target {
            SlashingTarget::Staking => (
                delegation.staking_info(&params)?,
                delegation.slashing_tx().to_tx()?,
                *delegation.delegator_slashing_sig(),
                delegation.covenant_sigs(),
            ),
            SlashingTarget::Unbonding => {
                let undelegation = delegation
                    .undelegation()
                    .ok_or(StakingError::State(StateTransitionError::MissingUndelegation))?;
                (
                    delegation.unbonding_info(&params)?,
                    undelegation.slashing_tx().to_tx()?,
                    *undelegation.delegator_slashing_sig(),
                    undelegation.covenant_slashing_sigs(),
                )
            }
        };
        let leaf = info.leaf_script(SpendPath::Slashing);

        let dk = DecryptionKey::from(validator_sk);
        let mut covenant = BTreeMap::new();
        for (pk, sigs) in covenant_sigs.select_quorum_subset(&params)? {
            let adaptor = sigs
                .get(index)
                .ok_or(CovenantSigError::WrongSignatureCount {
                    expected: delegation.validator_pks().len(),
                    got: sigs.len(),
                })?;
            let sig = adaptor.decrypt(&dk).map_err(StakingTxError::from)?;
            // A signature encrypted under another key decrypts to garbage.
            verify_spend_sig(&slashing_tx, info.output(), leaf, &pk.x_only(), &sig)?;
            covenant.insert(pk.x_only(), sig);
        }

        let validator_sig = sign_spend(&slashing_tx, info.output(), leaf, &validator_sk)?;
        let validators = BTreeMap::from([(validator_pk, validator_sig)]);

        Ok(slashing_witness(&info, &staker_sig, &validators, &covenant)?)
    }

    /// Completes the witness of the unbonding transaction with the staker's signature and the
    /// covenant unbonding signatures of the quorum subset.
    pub fn build_unbonding_witness(
        &self,
        staking_txid: &Txid,
        staker_sig: &SchnorrSig,
    ) -> Result<Witness, StakingError> {
        let delegation = self.get_delegation(staking_txid)?;
        let params = self.params_version(delegation.params_version())?.params;
        let undelegation = delegation
            .undelegation()
            .ok_or(StakingError::State(StateTransitionError::MissingUndelegation))?;

        let info = delegation.staking_info(&params)?;
        let leaf = info.leaf_script(SpendPath::Unbonding);
        let unbonding_tx = undelegation.unbonding_tx().to_tx()?;
        verify_spend_sig(
            &unbonding_tx,
            info.output(),
            leaf,
            &delegation.staker_pk().x_only(),
            staker_sig,
        )?;

        let covenant: BTreeMap<_, _> = undelegation
            .covenant_unbonding_sigs()
            .select_quorum_subset(&params)?
            .into_iter()
            .map(|(pk, sig)| (pk.x_only(), **sig))
            .collect();

        Ok(unbonding_witness(&info, staker_sig, &covenant)?)
    }
}
