//! Transaction fixtures: staking, unbonding and slashing transactions.

use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
    XOnlyPublicKey, absolute::LockTime, hashes::Hash, transaction::Version,
};
use strata_btcstaking::slashing::{build_slashing_tx, slashing_change_script};
use strata_params::StakingParams;

/// A made-up outpoint, distinct per `seed`.
pub fn outpoint(seed: u8, vout: u32) -> OutPoint {
    OutPoint::new(Txid::from_byte_array([seed; 32]), vout)
}

/// Unsigned transaction spending `prev` into `outputs`, with a final sequence.
pub fn spend_tx(prev: OutPoint, outputs: Vec<TxOut>) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: prev,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: outputs,
    }
}

/// Staking transaction funding `staking_output` at index 0 from `funding`.
pub fn staking_tx(funding: OutPoint, staking_output: TxOut) -> Transaction {
    spend_tx(funding, vec![staking_output])
}

/// Unbonding transaction moving the stake at `staking` into `unbonding_output`.
pub fn unbonding_tx(staking: OutPoint, unbonding_output: TxOut) -> Transaction {
    spend_tx(staking, vec![unbonding_output])
}

/// Slashing transaction for the output `funding` holding `amount`, paying the minimum slashed
/// share and the minimum fee, with change to `staker` after `change_timelock`.
pub fn slashing_tx(
    funding: OutPoint,
    amount: Amount,
    params: &StakingParams,
    staker: &XOnlyPublicKey,
    change_timelock: u16,
) -> Transaction {
    let change = slashing_change_script(staker, change_timelock).expect("valid change script");
    build_slashing_tx(funding, amount, params, change, params.min_slashing_tx_fee)
        .expect("valid fixture slashing tx")
}
