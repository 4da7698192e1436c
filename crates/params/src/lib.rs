//! Versioned BTC staking parameters.
//!
//! Parameters are never read from ambient state. Each record pins the [`ParamsVersion`] it was
//! created under and every validation takes the matching [`StakingParams`] explicitly, so a
//! later parameter change can never invalidate a record retroactively.

mod errors;
mod rate;
pub mod serde_helpers;

use std::{collections::BTreeSet, fmt};

use bitcoin::{Amount, ScriptBuf, XOnlyPublicKey};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use strata_crypto::EvenPublicKey;

pub use errors::ParamsError;
pub use rate::{BPS_DENOMINATOR, Rate};
use serde_helpers::{borsh_amount_sat, borsh_script_buf, serde_amount_sat};

/// Staking parameters in effect between two governance updates.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct StakingParams {
    /// Covenant committee. Order is irrelevant; scripts sort the keys themselves.
    pub covenant_pks: Vec<EvenPublicKey>,

    /// Number of distinct covenant signatures required on any covenant-gated path.
    pub covenant_quorum: u32,

    /// Output script the slashed portion of a stake is paid to.
    #[borsh(
        serialize_with = "borsh_script_buf::serialize",
        deserialize_with = "borsh_script_buf::deserialize"
    )]
    pub slashing_pk_script: ScriptBuf,

    /// Share of the staked amount a slashing transaction must pay to the slashing script.
    pub slashing_rate: Rate,

    /// Lowest fee a slashing transaction may pay.
    #[serde(with = "serde_amount_sat")]
    #[borsh(
        serialize_with = "borsh_amount_sat::serialize",
        deserialize_with = "borsh_amount_sat::deserialize"
    )]
    pub min_slashing_tx_fee: Amount,

    /// Lowest commission a validator may register with.
    pub min_commission_rate: Rate,

    /// Upper bound on validators that can be active at once.
    pub max_active_validators: u32,

    /// Highest fee an unbonding transaction may pay.
    #[serde(with = "serde_amount_sat")]
    #[borsh(
        serialize_with = "borsh_amount_sat::serialize",
        deserialize_with = "borsh_amount_sat::deserialize"
    )]
    pub max_unbonding_fee: Amount,
}

impl StakingParams {
    /// Checks the internal consistency of the parameter set.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.covenant_pks.is_empty() {
            return Err(ParamsError::EmptyCovenantSet);
        }

        let unique: BTreeSet<_> = self.covenant_x_only_pks().collect();
        if unique.len() != self.covenant_pks.len() {
            return Err(ParamsError::DuplicateCovenantKey);
        }

        if self.covenant_quorum == 0 || self.covenant_quorum as usize > self.covenant_pks.len() {
            return Err(ParamsError::InvalidQuorum {
                quorum: self.covenant_quorum,
                size: self.covenant_pks.len(),
            });
        }

        if !self.slashing_rate.is_proper_fraction() {
            return Err(ParamsError::InvalidSlashingRate);
        }

        if self.slashing_pk_script.is_empty() {
            return Err(ParamsError::EmptySlashingScript);
        }

        if self.max_active_validators == 0 {
            return Err(ParamsError::ZeroMaxActiveValidators);
        }

        Ok(())
    }

    /// Covenant keys in their x-only form, as committed to by scripts.
    pub fn covenant_x_only_pks(&self) -> impl Iterator<Item = XOnlyPublicKey> + '_ {
        self.covenant_pks.iter().map(|pk| XOnlyPublicKey::from(*pk))
    }

    pub fn is_covenant_member(&self, pk: &XOnlyPublicKey) -> bool {
        self.covenant_x_only_pks().any(|c| &c == pk)
    }
}

/// Monotonic identifier of a parameter set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct ParamsVersion(pub u32);

impl fmt::Display for ParamsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A parameter set together with the height from which it applies.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct VersionedParams {
    pub version: ParamsVersion,
    pub activation_height: u64,
    pub params: StakingParams,
}

/// Append-only history of parameter sets, ordered by activation height.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ParamsHistory {
    entries: Vec<VersionedParams>,
}

impl ParamsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a parameter set, returning the version assigned to it.
    pub fn push(
        &mut self,
        activation_height: u64,
        params: StakingParams,
    ) -> Result<ParamsVersion, ParamsError> {
        params.validate()?;

        if let Some(last) = self.entries.last()
            && activation_height <= last.activation_height
        {
            return Err(ParamsError::NonIncreasingActivation {
                prev: last.activation_height,
                got: activation_height,
            });
        }

        let version = ParamsVersion(self.entries.len() as u32);
        self.entries.push(VersionedParams {
            version,
            activation_height,
            params,
        });
        Ok(version)
    }

    pub fn get(&self, version: ParamsVersion) -> Result<&VersionedParams, ParamsError> {
        self.entries
            .get(version.0 as usize)
            .ok_or(ParamsError::UnknownVersion(version))
    }

    /// Returns the parameter set in effect at `height`.
    pub fn at_height(&self, height: u64) -> Result<&VersionedParams, ParamsError> {
        self.entries
            .iter()
            .rev()
            .find(|p| p.activation_height <= height)
            .ok_or(ParamsError::NoneActiveAt(height))
    }

    pub fn latest(&self) -> Option<&VersionedParams> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
