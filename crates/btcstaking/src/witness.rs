//! Tapscript witness assembly for the staking leaves.
//!
//! Leaf scripts consume signatures in key order: staker first, then validators, then the
//! covenant committee, each list in script order. The witness stack is the reverse of that,
//! followed by the leaf script and its control block.

use std::collections::BTreeMap;

use bitcoin::{Witness, XOnlyPublicKey, secp256k1::schnorr::Signature, taproot::ControlBlock};

use crate::{
    errors::StakingTxError,
    scripts::ScriptKeys,
    staking_info::{SpendPath, StakingInfo},
};

/// One stack element per key in `sorted_keys`: the key's signature, or empty if it has none.
fn multisig_elements(
    sorted_keys: &[XOnlyPublicKey],
    sigs: &BTreeMap<XOnlyPublicKey, Signature>,
) -> impl Iterator<Item = Vec<u8>> {
    sorted_keys.iter().map(|pk| {
        sigs.get(pk)
            .map(|sig| sig.serialize().to_vec())
            .unwrap_or_default()
    })
}

fn finish(
    mut consumed_first: Vec<Vec<u8>>,
    info: &StakingInfo,
    path: SpendPath,
) -> Result<Witness, StakingTxError> {
    let control_block: ControlBlock = info.control_block(path)?;
    consumed_first.reverse();

    let mut witness = Witness::new();
    for element in consumed_first {
        witness.push(element);
    }
    witness.push(info.leaf_script(path).as_bytes());
    witness.push(control_block.serialize());
    Ok(witness)
}

/// Witness for the slashing leaf of `info`.
pub fn slashing_witness(
    info: &StakingInfo,
    staker_sig: &Signature,
    validator_sigs: &BTreeMap<XOnlyPublicKey, Signature>,
    covenant_sigs: &BTreeMap<XOnlyPublicKey, Signature>,
) -> Result<Witness, StakingTxError> {
    let keys: &ScriptKeys = info.keys();
    let mut elements = vec![staker_sig.serialize().to_vec()];
    elements.extend(multisig_elements(keys.validators(), validator_sigs));
    elements.extend(multisig_elements(keys.covenants(), covenant_sigs));
    finish(elements, info, SpendPath::Slashing)
}

/// Witness for the unbonding leaf of `info`.
pub fn unbonding_witness(
    info: &StakingInfo,
    staker_sig: &Signature,
    covenant_sigs: &BTreeMap<XOnlyPublicKey, Signature>,
) -> Result<Witness, StakingTxError> {
    let mut elements = vec![staker_sig.serialize().to_vec()];
    elements.extend(multisig_elements(info.keys().covenants(), covenant_sigs));
    finish(elements, info, SpendPath::Unbonding)
}

/// Witness for the timelock leaf of `info`.
pub fn timelock_witness(
    info: &StakingInfo,
    staker_sig: &Signature,
) -> Result<Witness, StakingTxError> {
    finish(vec![staker_sig.serialize().to_vec()], info, SpendPath::Timelock)
}
