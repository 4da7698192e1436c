//! The staking keeper and its request handlers.

mod delegation;
mod unbonding;
mod witness;


use bitcoin::Txid;
use strata_btcstaking_state::Delegation;
use strata_config::StakingConfig;
use strata_params::{ParamsVersion, VersionedParams};
use tracing::{debug, warn};

pub use self::witness::SlashingTarget;
use crate::{
    errors::StakingError,
    msgs::{InclusionEvidence, StakingMsg, StakingResponse},
    traits::{BtcLightClient, DelegationStore, InclusionVerifier, ParamsStore, ValidatorRegistry},
};

/// Validates staking requests and applies them to the stores.
///
/// Every operation either applies in full or leaves the stores untouched.
#[derive(Debug)]
pub struct StakingKeeper<L, I, P, V, D> {
    config: StakingConfig,
    light_client: L,
    inclusion: I,
    params: P,
    validators: V,
    delegations: D,
}

impl<L, I, P, V, D> StakingKeeper<L, I, P, V, D>
where
    L: BtcLightClient,
    I: InclusionVerifier,
    P: ParamsStore,
    V: ValidatorRegistry,
    D: DelegationStore,
{
    pub fn new(
        config: StakingConfig,
        light_client: L,
        inclusion: I,
        params: P,
        validators: V,
        delegations: D,
    ) -> Self {
        Self {
            config,
            light_client,
            inclusion,
            params,
            validators,
            delegations,
        }
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    pub fn light_client(&self) -> &L {
        &self.light_client
    }

    pub fn light_client_mut(&mut self) -> &mut L {
        &mut self.light_client
    }

    pub fn validators(&self) -> &V {
        &self.validators
    }

    pub fn delegations(&self) -> &D {
        &self.delegations
    }

    /// Dispatches `msg` to the matching operation.
    pub fn handle(&mut self, msg: StakingMsg) -> Result<StakingResponse, StakingError> {
        let name = msg.name();
        let res = match msg {
            StakingMsg::RegisterValidator(m) => self
                .register_validator(m)
                .map(StakingResponse::ValidatorRegistered),
            StakingMsg::CreateDelegation(m) => self
                .create_delegation(m)
                .map(StakingResponse::DelegationCreated),
            StakingMsg::AddCovenantSigs(m) => self
                .add_covenant_sigs(m)
                .map(StakingResponse::Status),
            StakingMsg::Undelegate(m) => self.undelegate(m).map(StakingResponse::Status),
            StakingMsg::AddCovenantUnbondingSigs(m) => self
                .add_covenant_unbonding_sigs(m)
                .map(StakingResponse::Status),
            StakingMsg::ConfirmUnbonded(m) => self.confirm_unbonded(m).map(StakingResponse::Status),
            StakingMsg::RecordSlashed(m) => self.record_slashed(m).map(StakingResponse::Status),
        };

        match &res {
            Ok(resp) => debug!(msg = name, ?resp, "handled staking request"),
            Err(err) => warn!(
                msg = name,
                kind = ?err.kind(),
                retryable = err.is_retryable(),
                %err,
                "rejected staking request"
            ),
        }
        res
    }

    /// Loads the delegation recorded for `staking_txid`.
    pub fn get_delegation(&self, staking_txid: &Txid) -> Result<Delegation, StakingError> {
        self.delegations
            .get_delegation(staking_txid)?
            .ok_or(StakingError::DelegationNotFound(*staking_txid))
    }

    fn params_version(&self, version: ParamsVersion) -> Result<VersionedParams, StakingError> {
        self.params
            .params(version)
            .ok_or(StakingError::ParamsNotFound(version))
    }

    fn params_at_height(&self, height: u64) -> Result<VersionedParams, StakingError> {
        self.params
            .params_at_height(height)
            .ok_or(StakingError::NoParamsAtHeight(height))
    }

    /// Unbonding timelocks must outlast checkpoint finalization and fit in the staking
    /// timelock.
    fn check_unbonding_time(
        &self,
        unbonding_time: u16,
        staking_time: u16,
    ) -> Result<(), StakingError> {
        let min = self.config.checkpoint_finalization_timeout;
        if u64::from(unbonding_time) <= min || unbonding_time > staking_time {
            return Err(StakingError::InvalidUnbondingTime {
                min,
                max: staking_time,
                got: unbonding_time,
            });
        }
        Ok(())
    }

    /// Checks that `txid` is included in the evidence block and buried deep enough, returning
    /// the inclusion height.
    fn verify_confirmed(
        &self,
        txid: &Txid,
        evidence: &InclusionEvidence,
    ) -> Result<u64, StakingError> {
        let (height, header) = self
            .light_client
            .header_at_hash(&evidence.block_hash)
            .ok_or(StakingError::HeaderNotFound(evidence.block_hash))?;

        self.inclusion
            .verify_inclusion(txid, &header, &evidence.proof)?;

        let depth = self.light_client.chain_tip().saturating_sub(height);
        let required = self.config.btc_confirmation_depth;
        if depth < required {
            return Err(StakingError::InsufficientConfirmations { depth, required });
        }
        Ok(height)
    }
}
