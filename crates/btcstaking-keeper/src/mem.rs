//! In-memory implementations of the store traits.

use std::collections::BTreeMap;

use bitcoin::Txid;
use strata_btcstaking_state::{Delegation, Validator};
use strata_crypto::EvenPublicKey;
use strata_params::{ParamsHistory, ParamsVersion, VersionedParams};

use crate::{
    errors::StoreError,
    traits::{DelegationStore, ParamsStore, ValidatorRegistry},
};

/// Serves parameters from a [`ParamsHistory`].
#[derive(Debug, Clone, Default)]
pub struct MemParamsStore {
    history: ParamsHistory,
}

impl MemParamsStore {
    pub fn new(history: ParamsHistory) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &ParamsHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut ParamsHistory {
        &mut self.history
    }
}

impl ParamsStore for MemParamsStore {
    fn params(&self, version: ParamsVersion) -> Option<VersionedParams> {
        self.history.get(version).ok().cloned()
    }

    fn params_at_height(&self, height: u64) -> Option<VersionedParams> {
        self.history.at_height(height).ok().cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemValidatorRegistry {
    validators: BTreeMap<EvenPublicKey, Validator>,
}

impl MemValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ValidatorRegistry for MemValidatorRegistry {
    fn has_validator(&self, pk: &EvenPublicKey) -> Result<bool, StoreError> {
        Ok(self.validators.contains_key(pk))
    }

    fn get_validator(&self, pk: &EvenPublicKey) -> Result<Option<Validator>, StoreError> {
        Ok(self.validators.get(pk).cloned())
    }

    fn put_validator(&mut self, validator: Validator) -> Result<(), StoreError> {
        self.validators.insert(*validator.btc_pk(), validator);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemDelegationStore {
    delegations: BTreeMap<Txid, Delegation>,
}

impl MemDelegationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.delegations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegations.is_empty()
    }
}

impl DelegationStore for MemDelegationStore {
    fn get_delegation(&self, staking_txid: &Txid) -> Result<Option<Delegation>, StoreError> {
        Ok(self.delegations.get(staking_txid).cloned())
    }

    fn has_delegation(&self, staking_txid: &Txid) -> Result<bool, StoreError> {
        Ok(self.delegations.contains_key(staking_txid))
    }

    fn put_delegation(
        &mut self,
        staking_txid: Txid,
        delegation: Delegation,
    ) -> Result<(), StoreError> {
        self.delegations.insert(staking_txid, delegation);
        Ok(())
    }
}
