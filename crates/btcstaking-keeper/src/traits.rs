//! Capabilities the keeper needs from its host.

use bitcoin::{BlockHash, Txid, block::Header};
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use strata_btcstaking::{InclusionError, InclusionProof};
use strata_btcstaking_state::{Delegation, Validator};
use strata_crypto::EvenPublicKey;
use strata_params::{ParamsVersion, VersionedParams};

use crate::errors::StoreError;

/// View of the Bitcoin chain maintained by a light client.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait BtcLightClient {
    /// Height and header of the block with `hash`, if it is on the best chain.
    fn header_at_hash(&self, hash: &BlockHash) -> Option<(u64, Header)>;

    /// Height of the best chain tip.
    fn chain_tip(&self) -> u64;
}

/// Checks that a transaction is committed to by a block header.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait InclusionVerifier {
    fn verify_inclusion(
        &self,
        txid: &Txid,
        header: &Header,
        proof: &InclusionProof,
    ) -> Result<(), InclusionError>;
}

/// Read access to the versioned staking parameters.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ParamsStore {
    fn params(&self, version: ParamsVersion) -> Option<VersionedParams>;

    /// The parameter set in effect at Bitcoin height `height`.
    fn params_at_height(&self, height: u64) -> Option<VersionedParams>;
}

/// Registered validators, keyed by BTC public key.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ValidatorRegistry {
    fn has_validator(&self, pk: &EvenPublicKey) -> Result<bool, StoreError>;

    fn get_validator(&self, pk: &EvenPublicKey) -> Result<Option<Validator>, StoreError>;

    fn put_validator(&mut self, validator: Validator) -> Result<(), StoreError>;
}

/// Delegation records, keyed by staking txid.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait DelegationStore {
    fn get_delegation(&self, staking_txid: &Txid) -> Result<Option<Delegation>, StoreError>;

    fn has_delegation(&self, staking_txid: &Txid) -> Result<bool, StoreError>;

    /// Inserts or overwrites the record for `staking_txid`.
    fn put_delegation(&mut self, staking_txid: Txid, delegation: Delegation)
    -> Result<(), StoreError>;
}
