//! Undelegation and the terminal transitions.

use bitcoin::{Amount, OutPoint, Transaction, TxOut};
use strata_btcstaking::{
    RawBitcoinTx, SpendPath, StakingInfo,
    sighash::{verify_spend_adaptor_sig, verify_spend_sig},
    slashing::{slashing_change_script, validate_slashing_tx},
};
use strata_btcstaking_state::{DelegationStatus, StateTransitionError, Undelegation};
use strata_crypto::EncryptionKey;
use tracing::{info, warn};

use super::StakingKeeper;
use crate::{
    errors::{StakingError, UnbondingTxFault},
    msgs::{MsgAddCovenantUnbondingSigs, MsgConfirmUnbonded, MsgRecordSlashed, MsgUndelegate},
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
    /// Attaches an undelegation to an active delegation.
    ///
    /// The unbonding output must carry the same script family as the staking output, with the
    /// unbonding timelock. The undelegation pins the parameters current at the tip, which bound
    /// the unbonding fee and govern its slashing transaction.
    pub fn undelegate(&mut self, msg: MsgUndelegate) -> Result<DelegationStatus, StakingError> {
        let mut delegation = self.get_delegation(&msg.staking_txid)?;
        if delegation.undelegation().is_some() {
            return Err(StakingError::UndelegationExists);
        }
        if delegation.status() != DelegationStatus::Active {
            return Err(StakingError::State(StateTransitionError::InvalidTransition {
                from: delegation.status(),
                to: DelegationStatus::UnbondingRequested,
            }));
        }

        let tip = self.light_client.chain_tip();
        if tip >= delegation.end_height() {
            return Err(StakingError::StakingExpired {
                end_height: delegation.end_height(),
                tip,
            });
        }

        self.check_unbonding_time(msg.unbonding_time, delegation.staking_time())?;

        let params = self.params_version(delegation.params_version())?.params;
        let current = self.params_at_height(tip)?;

        let unbonding_tx = RawBitcoinTx::try_from_bytes(msg.unbonding_tx)?;
        let tx = unbonding_tx.to_tx()?;
        let unbonding_output = check_unbonding_tx(
            &tx,
            delegation.staking_outpoint()?,
            delegation.total_amount(),
            current.params.max_unbonding_fee,
        )?;

        let covenants: Vec<_> = params.covenant_x_only_pks().collect();
        let info = StakingInfo::from_keys(
            delegation.staker_pk().x_only(),
            &delegation.validator_x_only_pks(),
            &covenants,
            params.covenant_quorum,
            msg.unbonding_time,
            unbonding_output.value,
        )?;
        if info.script_pubkey() != &unbonding_output.script_pubkey {
            return Err(StakingError::InvalidUnbondingScript);
        }

        let slashing_tx = RawBitcoinTx::try_from_bytes(msg.slashing_tx)?;
        let slashing = slashing_tx.to_tx()?;
        let unbonding_outpoint = OutPoint::new(tx.compute_txid(), 0);
        let change_script =
            slashing_change_script(&delegation.staker_pk().x_only(), msg.unbonding_time)?;
        validate_slashing_tx(
            &slashing,
            unbonding_outpoint,
            unbonding_output.value,
            &change_script,
            &current.params,
        )
        .map_err(StakingError::InvalidSlashingTx)?;
        verify_spend_sig(
            &slashing,
            info.output(),
            info.leaf_script(SpendPath::Slashing),
            &delegation.staker_pk().x_only(),
            &msg.delegator_slashing_sig,
        )
        .map_err(|_| StakingError::InvalidSlashingSignature)?;

        delegation.begin_unbonding(Undelegation::new(
            unbonding_tx,
            msg.unbonding_time,
            current.version,
            slashing_tx,
            msg.delegator_slashing_sig,
        ))?;
        self.delegations.put_delegation(msg.staking_txid, delegation)?;

        info!(
            staking_txid = %msg.staking_txid,
            unbonding_txid = %unbonding_outpoint.txid,
            unbonding_time = msg.unbonding_time,
            "unbonding requested"
        );
        Ok(DelegationStatus::UnbondingRequested)
    }

    /// Accepts a covenant member's signature over the unbonding transaction together with its
    /// adaptor signatures over the unbonding slashing transaction.
    pub fn add_covenant_unbonding_sigs(
        &mut self,
        msg: MsgAddCovenantUnbondingSigs,
    ) -> Result<DelegationStatus, StakingError> {
        let mut delegation = self.get_delegation(&msg.staking_txid)?;
        let params = self.params_version(delegation.params_version())?.params;

        delegation.check_covenant_unbonding_sigs(
            &params,
            &msg.covenant_pk,
            msg.slashing_sigs.len(),
        )?;
        let undelegation = delegation
            .undelegation()
            .ok_or(StakingError::State(StateTransitionError::MissingUndelegation))?;
        let covenant = msg.covenant_pk.x_only();

        let staking_info = delegation.staking_info(&params)?;
        let unbonding_tx = undelegation.unbonding_tx().to_tx()?;
        verify_spend_sig(
            &unbonding_tx,
            staking_info.output(),
            staking_info.leaf_script(SpendPath::Unbonding),
            &covenant,
            &msg.unbonding_sig,
        )
        .map_err(|_| StakingError::InvalidUnbondingSignature)?;

        let unbonding_info = delegation.unbonding_info(&params)?;
        let slashing_tx = undelegation.slashing_tx().to_tx()?;
        for (index, (sig, validator)) in msg
            .slashing_sigs
            .iter()
            .zip(delegation.validator_pks())
            .enumerate()
        {
            verify_spend_adaptor_sig(
                &slashing_tx,
                unbonding_info.output(),
                unbonding_info.leaf_script(SpendPath::Slashing),
                &covenant,
                &EncryptionKey::from(validator.x_only()),
                sig,
            )
            .map_err(|_| StakingError::InvalidAdaptorSignature { index })?;
        }

        let status = delegation.add_covenant_unbonding_sigs(
            &params,
            msg.covenant_pk,
            msg.unbonding_sig,
            msg.slashing_sigs,
        )?;
        self.delegations.put_delegation(msg.staking_txid, delegation)?;

        if status == DelegationStatus::UnbondingActive {
            info!(staking_txid = %msg.staking_txid, "unbonding active");
        }
        Ok(status)
    }

    /// Marks a delegation unbonded once its unbonding transaction is confirmed.
    pub fn confirm_unbonded(
        &mut self,
        msg: MsgConfirmUnbonded,
    ) -> Result<DelegationStatus, StakingError> {
        let mut delegation = self.get_delegation(&msg.staking_txid)?;
        if delegation.status() != DelegationStatus::UnbondingActive {
            return Err(StakingError::State(StateTransitionError::InvalidTransition {
                from: delegation.status(),
                to: DelegationStatus::Unbonded,
            }));
        }

        let unbonding_txid = delegation
            .undelegation()
            .ok_or(StakingError::State(StateTransitionError::MissingUndelegation))?
            .unbonding_txid()?;
        let height = self.verify_confirmed(&unbonding_txid, &msg.inclusion)?;

        let params = self.params_version(delegation.params_version())?.params;
        delegation.confirm_unbonded(&params)?;
        self.delegations.put_delegation(msg.staking_txid, delegation)?;

        info!(staking_txid = %msg.staking_txid, %unbonding_txid, height, "delegation unbonded");
        Ok(DelegationStatus::Unbonded)
    }

    /// Marks a delegation slashed once one of its slashing transactions is confirmed.
    pub fn record_slashed(
        &mut self,
        msg: MsgRecordSlashed,
    ) -> Result<DelegationStatus, StakingError> {
        let mut delegation = self.get_delegation(&msg.staking_txid)?;
        if !delegation.status().can_transition_to(DelegationStatus::Slashed) {
            return Err(StakingError::State(StateTransitionError::InvalidTransition {
                from: delegation.status(),
                to: DelegationStatus::Slashed,
            }));
        }
        if delegation.validator_index(&msg.validator_pk).is_none() {
            return Err(StakingError::ValidatorNotInDelegation(
                msg.validator_pk.x_only(),
            ));
        }

        let staking_slashing = delegation.slashing_tx().txid()?;
        let unbonding_slashing = match delegation.undelegation() {
            Some(undelegation) => Some(undelegation.slashing_tx().txid()?),
            None => None,
        };

        let mut confirmed = self
            .verify_confirmed(&staking_slashing, &msg.inclusion)
            .map(|_| staking_slashing);
        if confirmed.is_err()
            && let Some(txid) = unbonding_slashing
        {
            confirmed = self
                .verify_confirmed(&txid, &msg.inclusion)
                .map(|_| txid);
        }
        let slashing_txid = confirmed?;

        delegation.mark_slashed()?;
        self.delegations.put_delegation(msg.staking_txid, delegation)?;

        warn!(
            staking_txid = %msg.staking_txid,
            %slashing_txid,
            validator = %msg.validator_pk.x_only(),
            "delegation slashed"
        );
        Ok(DelegationStatus::Slashed)
    }
}

/// Checks the shape of an unbonding transaction and returns its single output.
fn check_unbonding_tx(
    tx: &Transaction,
    staking_outpoint: OutPoint,
    staked: Amount,
    max_fee: Amount,
) -> Result<TxOut, UnbondingTxFault> {
    if tx.input.len() != 1 {
        return Err(UnbondingTxFault::InputCount(tx.input.len()));
    }
    let spent = tx.input[0].previous_output;
    if spent != staking_outpoint {
        return Err(UnbondingTxFault::WrongInput {
            expected: staking_outpoint,
            got: spent,
        });
    }

    if tx.output.len() != 1 {
        return Err(UnbondingTxFault::OutputCount(tx.output.len()));
    }
    let output = &tx.output[0];
    let fee = staked
        .checked_sub(output.value)
        .ok_or(UnbondingTxFault::OutputExceedsStake {
            staked,
            unbonding: output.value,
        })?;
    if fee == Amount::ZERO || fee > max_fee {
        return Err(UnbondingTxFault::FeeOutOfRange { fee, max: max_fee });
    }
    Ok(output.clone())
}
