use bitcoin::{
    Address, Amount, Network, ScriptBuf, TxOut, XOnlyPublicKey,
    secp256k1::SECP256K1,
    taproot::{ControlBlock, LeafVersion, TaprootBuilder, TaprootSpendInfo},
};

use crate::{
    errors::{StakingScriptError, StakingTxError},
    scripts::{ScriptKeys, UNSPENDABLE_INTERNAL_KEY},
};

/// The three script paths of a staking or unbonding output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpendPath {
    /// Staker alone, after the relative timelock.
    Timelock,
    /// Staker and a covenant quorum, immediately.
    Unbonding,
    /// Staker, one validator and a covenant quorum, immediately.
    Slashing,
}

/// Output script and spend data of a staking (or unbonding) output.
///
/// The unbonding output uses the same three-leaf family as the staking output, rooted at the
/// same keys, with the unbonding timelock in place of the staking timelock.
#[derive(Debug, Clone)]
pub struct StakingInfo {
    keys: ScriptKeys,
    timelock: u16,
    timelock_script: ScriptBuf,
    unbonding_script: ScriptBuf,
    slashing_script: ScriptBuf,
    spend_info: TaprootSpendInfo,
    output: TxOut,
}

impl StakingInfo {
    /// Builds the taproot tree and output for `amount` locked under `keys`.
    ///
    /// Leaf depths are 2 (timelock), 2 (unbonding) and 1 (slashing), under an unspendable
    /// internal key.
    pub fn new(
        keys: ScriptKeys,
        timelock: u16,
        amount: Amount,
    ) -> Result<Self, StakingScriptError> {
        let timelock_script = keys.timelock_script(timelock)?;
        let unbonding_script = keys.unbonding_script();
        let slashing_script = keys.slashing_script();

        let spend_info = TaprootBuilder::new()
            .add_leaf(2, timelock_script.clone())?
            .add_leaf(2, unbonding_script.clone())?
            .add_leaf(1, slashing_script.clone())?
            .finalize(SECP256K1, *UNSPENDABLE_INTERNAL_KEY)
            .map_err(|_| StakingScriptError::IncompleteTree)?;

        let script_pubkey = ScriptBuf::new_p2tr_tweaked(spend_info.output_key());
        let dust_limit = script_pubkey.minimal_non_dust();
        if amount < dust_limit {
            return Err(StakingScriptError::InvalidAmount { amount, dust_limit });
        }

        Ok(Self {
            keys,
            timelock,
            timelock_script,
            unbonding_script,
            slashing_script,
            spend_info,
            output: TxOut {
                value: amount,
                script_pubkey,
            },
        })
    }

    /// Convenience over [`ScriptKeys::new`] and [`StakingInfo::new`].
    pub fn from_keys(
        staker: XOnlyPublicKey,
        validators: &[XOnlyPublicKey],
        covenants: &[XOnlyPublicKey],
        covenant_quorum: u32,
        timelock: u16,
        amount: Amount,
    ) -> Result<Self, StakingScriptError> {
        let keys = ScriptKeys::new(staker, validators, covenants, covenant_quorum)?;
        Self::new(keys, timelock, amount)
    }

    pub fn keys(&self) -> &ScriptKeys {
        &self.keys
    }

    pub fn timelock(&self) -> u16 {
        self.timelock
    }

    pub fn output(&self) -> &TxOut {
        &self.output
    }

    pub fn script_pubkey(&self) -> &ScriptBuf {
        &self.output.script_pubkey
    }

    pub fn spend_info(&self) -> &TaprootSpendInfo {
        &self.spend_info
    }

    pub fn address(&self, network: Network) -> Address {
        Address::p2tr_tweaked(self.spend_info.output_key(), network)
    }

    pub fn leaf_script(&self, path: SpendPath) -> &ScriptBuf {
        match path {
            SpendPath::Timelock => &self.timelock_script,
            SpendPath::Unbonding => &self.unbonding_script,
            SpendPath::Slashing => &self.slashing_script,
        }
    }

    pub fn control_block(&self, path: SpendPath) -> Result<ControlBlock, StakingTxError> {
        let script = self.leaf_script(path).clone();
        self.spend_info
            .control_block(&(script, LeafVersion::TapScript))
            .ok_or(StakingTxError::UnknownLeaf)
    }
}
