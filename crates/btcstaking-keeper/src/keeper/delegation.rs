//! Validator registration, delegation creation and covenant approval.

use std::collections::BTreeSet;

use bitcoin::{Amount, OutPoint, Txid};
use strata_btcstaking::{
    KeyRole, KeySetFault, RawBitcoinTx, SpendPath, StakingInfo, StakingScriptError,
    sighash::{verify_spend_adaptor_sig, verify_spend_sig},
    slashing::{slashing_change_script, validate_slashing_tx},
    tx::tx_output,
};
use strata_btcstaking_state::{Delegation, DelegationInit, DelegationStatus};
use strata_crypto::{EncryptionKey, EvenPublicKey};
use tracing::info;

use super::StakingKeeper;
use crate::{
    errors::StakingError,
    msgs::{MsgAddCovenantSigs, MsgCreateDelegation, MsgRegisterValidator},
    traits::{BtcLightClient, DelegationStore, InclusionVerifier, ParamsStore, ValidatorRegistry},
};

impl<L, I, P, V, D> StakingKeeper<L, I, P, V, D>
where
    L: BtcLightClient,
    I: InclusionVerifier,
    P: ParamsStore,
    V: ValidatorRegistry,
    D: DelegationStore,
{
    /// Registers a validator under the parameters current at the chain tip.
    pub fn register_validator(
        &mut self,
        msg: MsgRegisterValidator,
    ) -> Result<EvenPublicKey, StakingError> {
        let validator = msg.validator;
        let params = self.params_at_height(self.light_client.chain_tip())?;
        validator.validate(&params.params)?;

        let btc_pk = *validator.btc_pk();
        if self.validators.has_validator(&btc_pk)? {
            return Err(StakingError::DuplicateValidator(btc_pk.x_only()));
        }

        self.validators.put_validator(validator)?;
        info!(validator = %btc_pk.x_only(), "registered validator");
        Ok(btc_pk)
    }

    /// Records a new delegation in the pending state.
    ///
    /// The delegation pins the parameters in effect at the height its staking transaction was
    /// included at.
    pub fn create_delegation(&mut self, msg: MsgCreateDelegation) -> Result<Txid, StakingError> {
        self.check_validator_list(&msg.validator_pks)?;

        let staking_tx = RawBitcoinTx::try_from_bytes(msg.staking_tx)?;
        let staking_txid = staking_tx.txid()?;
        if self.delegations.has_delegation(&staking_txid)? {
            return Err(StakingError::DuplicateDelegation(staking_txid));
        }

        let start_height = self.verify_confirmed(&staking_txid, &msg.inclusion)?;
        let versioned = self.params_at_height(start_height)?;
        let params = &versioned.params;

        let covenants: Vec<_> = params.covenant_x_only_pks().collect();
        let validators: Vec<_> = msg.validator_pks.iter().map(|pk| pk.x_only()).collect();
        let info = StakingInfo::from_keys(
            msg.staker_pk.x_only(),
            &validators,
            &covenants,
            params.covenant_quorum,
            msg.staking_time,
            Amount::from_sat(msg.staking_value),
        )?;
        let tx = staking_tx.to_tx()?;
        if tx_output(&tx, msg.staking_output_index)? != info.output() {
            return Err(StakingError::InvalidStakingTx);
        }

        let tip = self.light_client.chain_tip();
        let end_height = start_height + u64::from(msg.staking_time);
        let remaining = end_height.saturating_sub(tip);
        let required = self.config.checkpoint_finalization_timeout;
        if remaining < required {
            return Err(StakingError::StakingTimelockTooShort {
                remaining,
                required,
            });
        }

        self.check_unbonding_time(msg.unbonding_time, msg.staking_time)?;

        let slashing_tx = RawBitcoinTx::try_from_bytes(msg.slashing_tx)?;
        let staking_outpoint = OutPoint::new(staking_txid, msg.staking_output_index);
        let slashing = slashing_tx.to_tx()?;
        let change_script = slashing_change_script(&msg.staker_pk.x_only(), msg.unbonding_time)?;
        validate_slashing_tx(
            &slashing,
            staking_outpoint,
            info.output().value,
            &change_script,
            params,
        )
        .map_err(StakingError::InvalidSlashingTx)?;
        verify_spend_sig(
            &slashing,
            info.output(),
            info.leaf_script(SpendPath::Slashing),
            &msg.staker_pk.x_only(),
            &msg.delegator_slashing_sig,
        )
        .map_err(|_| StakingError::InvalidSlashingSignature)?;

        let delegation = Delegation::new(DelegationInit {
            staker_pk: msg.staker_pk,
            validator_pks: msg.validator_pks,
            staking_tx,
            staking_output_index: msg.staking_output_index,
            total_sat: msg.staking_value,
            staking_time: msg.staking_time,
            start_height,
            params_version: versioned.version,
            slashing_tx,
            delegator_slashing_sig: msg.delegator_slashing_sig,
        });
        self.delegations.put_delegation(staking_txid, delegation)?;

        info!(
            %staking_txid,
            staker = %msg.staker_pk.x_only(),
            value = msg.staking_value,
            start_height,
            end_height,
            params = %versioned.version,
            "created delegation"
        );
        Ok(staking_txid)
    }

    /// Accepts a covenant member's adaptor signatures over the staking slashing transaction.
    pub fn add_covenant_sigs(
        &mut self,
        msg: MsgAddCovenantSigs,
    ) -> Result<DelegationStatus, StakingError> {
        let mut delegation = self.get_delegation(&msg.staking_txid)?;
        let params = self.params_version(delegation.params_version())?.params;

        delegation.check_covenant_sigs(&params, &msg.covenant_pk, msg.slashing_sigs.len())?;

        let info = delegation.staking_info(&params)?;
        let slashing_tx = delegation.slashing_tx().to_tx()?;
        let covenant = msg.covenant_pk.x_only();
        for (index, (sig, validator)) in msg
            .slashing_sigs
            .iter()
            .zip(delegation.validator_pks())
            .enumerate()
        {
            verify_spend_adaptor_sig(
                &slashing_tx,
                info.output(),
                info.leaf_script(SpendPath::Slashing),
                &covenant,
                &EncryptionKey::from(validator.x_only()),
                sig,
            )
            .map_err(|_| StakingError::InvalidAdaptorSignature { index })?;
        }

        let status = delegation.add_covenant_sigs(&params, msg.covenant_pk, msg.slashing_sigs)?;
        self.delegations.put_delegation(msg.staking_txid, delegation)?;

        if status == DelegationStatus::Active {
            info!(staking_txid = %msg.staking_txid, "delegation active");
        }
        Ok(status)
    }

    fn check_validator_list(&self, validator_pks: &[EvenPublicKey]) -> Result<(), StakingError> {
        let invalid = |fault| StakingScriptError::InvalidKeySet {
            role: KeyRole::Validator,
            fault,
        };

        if validator_pks.is_empty() {
            return Err(invalid(KeySetFault::Empty).into());
        }
        let unique: BTreeSet<_> = validator_pks.iter().collect();
        if unique.len() != validator_pks.len() {
            return Err(invalid(KeySetFault::Duplicate).into());
        }

        let max = self.config.max_validators_per_delegation;
        if validator_pks.len() > max {
            return Err(StakingError::TooManyValidators {
                max,
                got: validator_pks.len(),
            });
        }

        for pk in validator_pks {
            if !self.validators.has_validator(pk)? {
                return Err(StakingError::ValidatorNotFound(pk.x_only()));
            }
        }
        Ok(())
    }
}
