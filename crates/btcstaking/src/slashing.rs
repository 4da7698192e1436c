//! Slashing transaction shape rules.

use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Witness, XOnlyPublicKey,
    absolute::LockTime,
    secp256k1::SECP256K1,
    taproot::TaprootBuilder,
    transaction::Version,
};
use strata_params::StakingParams;

use crate::{
    errors::{SlashingTxFault, StakingScriptError},
    scripts::{UNSPENDABLE_INTERNAL_KEY, timelock_script},
};

/// Checks that `tx` is a well formed slashing transaction for the output `funding` holding
/// `funding_amount`.
///
/// Output 0 must pay at least `floor(funding_amount * slashing_rate)` to the slashing script,
/// output 1 must pay `change_script`, and the fee must reach the configured minimum.
pub fn validate_slashing_tx(
    tx: &Transaction,
    funding: OutPoint,
    funding_amount: Amount,
    change_script: &ScriptBuf,
    params: &StakingParams,
) -> Result<(), SlashingTxFault> {
    let [input] = tx.input.as_slice() else {
        return Err(SlashingTxFault::InputCount(tx.input.len()));
    };
    if input.previous_output != funding {
        return Err(SlashingTxFault::WrongInput {
            expected: funding,
            got: input.previous_output,
        });
    }
    if input.sequence != Sequence::MAX {
        return Err(SlashingTxFault::NonFinalSequence);
    }
    if tx.lock_time != LockTime::ZERO {
        return Err(SlashingTxFault::NonZeroLockTime);
    }

    let [slashing_out, change_out] = tx.output.as_slice() else {
        return Err(SlashingTxFault::OutputCount(tx.output.len()));
    };
    if slashing_out.script_pubkey != params.slashing_pk_script {
        return Err(SlashingTxFault::WrongSlashingScript);
    }
    if &change_out.script_pubkey != change_script {
        return Err(SlashingTxFault::WrongChangeScript);
    }
    let min_slashed = params.slashing_rate.apply(funding_amount);
    if slashing_out.value < min_slashed {
        return Err(SlashingTxFault::SlashingAmountTooLow {
            expected: min_slashed,
            got: slashing_out.value,
        });
    }

    let fee = slashing_out
        .value
        .checked_add(change_out.value)
        .and_then(|total| funding_amount.checked_sub(total))
        .ok_or(SlashingTxFault::OutputsExceedInput)?;
    if fee < params.min_slashing_tx_fee {
        return Err(SlashingTxFault::FeeTooLow {
            expected: params.min_slashing_tx_fee,
            got: fee,
        });
    }

    for (i, out) in tx.output.iter().enumerate() {
        if out.value < out.script_pubkey.minimal_non_dust() {
            return Err(SlashingTxFault::DustOutput(i));
        }
    }

    Ok(())
}

/// Output script of a slashing transaction's change: the staker alone, after `timelock`.
pub fn slashing_change_script(
    staker: &XOnlyPublicKey,
    timelock: u16,
) -> Result<ScriptBuf, StakingScriptError> {
    let spend_info = TaprootBuilder::new()
        .add_leaf(0, timelock_script(staker, timelock)?)?
        .finalize(SECP256K1, *UNSPENDABLE_INTERNAL_KEY)
        .map_err(|_| StakingScriptError::IncompleteTree)?;
    Ok(ScriptBuf::new_p2tr_tweaked(spend_info.output_key()))
}

/// Builds an unsigned slashing transaction paying exactly the minimum slashed amount and
/// `fee`, with the remainder going to `change_script`.
pub fn build_slashing_tx(
    funding: OutPoint,
    funding_amount: Amount,
    params: &StakingParams,
    change_script: ScriptBuf,
    fee: Amount,
) -> Result<Transaction, SlashingTxFault> {
    let slashed = params.slashing_rate.apply(funding_amount);
    let change = funding_amount
        .checked_sub(slashed)
        .and_then(|rest| rest.checked_sub(fee))
        .ok_or(SlashingTxFault::OutputsExceedInput)?;

    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: funding,
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![
            TxOut {
                value: slashed,
                script_pubkey: params.slashing_pk_script.clone(),
            },
            TxOut {
                value: change,
                script_pubkey: change_script.clone(),
            },
        ],
    };

    validate_slashing_tx(&tx, funding, funding_amount, &change_script, params)?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use bitcoin::{
        Txid,
        hashes::Hash,
        secp256k1::{PublicKey, SecretKey},
    };
    use strata_params::Rate;

    use super::*;

    fn xonly(byte: u8) -> XOnlyPublicKey {
        SecretKey::from_slice(&[byte; 32])
            .unwrap()
            .x_only_public_key(SECP256K1)
            .0
    }

    fn params() -> StakingParams {
        let covenant = SecretKey::from_slice(&[9; 32]).unwrap();
        StakingParams {
            covenant_pks: vec![PublicKey::from_secret_key(SECP256K1, &covenant).into()],
            covenant_quorum: 1,
            slashing_pk_script: slashing_change_script(&xonly(42), 10).unwrap(),
            slashing_rate: Rate::from_bps(1_000).unwrap(),
            min_slashing_tx_fee: Amount::from_sat(1_000),
            min_commission_rate: Rate::ZERO,
            max_active_validators: 10,
            max_unbonding_fee: Amount::from_sat(5_000),
        }
    }

    fn funding() -> OutPoint {
        OutPoint::new(Txid::from_byte_array([7; 32]), 1)
    }

    fn change() -> ScriptBuf {
        slashing_change_script(&xonly(1), 100).unwrap()
    }

    fn valid_tx() -> Transaction {
        build_slashing_tx(
            funding(),
            Amount::from_sat(100_000),
            &params(),
            change(),
            Amount::from_sat(1_000),
        )
        .unwrap()
    }

    fn check(tx: &Transaction) -> Result<(), SlashingTxFault> {
        validate_slashing_tx(tx, funding(), Amount::from_sat(100_000), &change(), &params())
    }

    #[test]
    fn test_built_tx_is_valid() {
        let tx = valid_tx();
        assert_eq!(tx.output[0].value, Amount::from_sat(10_000));
        assert_eq!(tx.output[1].value, Amount::from_sat(89_000));
        check(&tx).unwrap();
    }

    #[test]
    fn test_input_rules() {
        let mut tx = valid_tx();
        tx.input[0].previous_output.vout = 0;
        assert!(matches!(check(&tx), Err(SlashingTxFault::WrongInput { .. })));

        let mut tx = valid_tx();
        tx.input[0].sequence = Sequence::ENABLE_RBF_NO_LOCKTIME;
        assert_eq!(check(&tx), Err(SlashingTxFault::NonFinalSequence));

        let mut tx = valid_tx();
        tx.lock_time = LockTime::from_height(10).unwrap();
        assert_eq!(check(&tx), Err(SlashingTxFault::NonZeroLockTime));

        let mut tx = valid_tx();
        tx.input.push(tx.input[0].clone());
        assert_eq!(check(&tx), Err(SlashingTxFault::InputCount(2)));
    }

    #[test]
    fn test_output_rules() {
        let mut tx = valid_tx();
        tx.output.pop();
        assert_eq!(check(&tx), Err(SlashingTxFault::OutputCount(1)));

        let mut tx = valid_tx();
        tx.output.swap(0, 1);
        assert_eq!(check(&tx), Err(SlashingTxFault::WrongSlashingScript));

        let mut tx = valid_tx();
        tx.output[1].script_pubkey = slashing_change_script(&xonly(2), 100).unwrap();
        assert_eq!(check(&tx), Err(SlashingTxFault::WrongChangeScript));

        let mut tx = valid_tx();
        tx.output[1].script_pubkey = slashing_change_script(&xonly(1), 99).unwrap();
        assert_eq!(check(&tx), Err(SlashingTxFault::WrongChangeScript));

        let mut tx = valid_tx();
        tx.output[0].value = Amount::from_sat(9_999);
        tx.output[1].value = Amount::from_sat(89_001);
        assert_eq!(
            check(&tx),
            Err(SlashingTxFault::SlashingAmountTooLow {
                expected: Amount::from_sat(10_000),
                got: Amount::from_sat(9_999)
            })
        );
    }

    #[test]
    fn test_fee_rules() {
        let mut tx = valid_tx();
        tx.output[1].value = Amount::from_sat(89_001);
        assert_eq!(
            check(&tx),
            Err(SlashingTxFault::FeeTooLow {
                expected: Amount::from_sat(1_000),
                got: Amount::from_sat(999)
            })
        );

        let mut tx = valid_tx();
        tx.output[1].value = Amount::from_sat(95_000);
        assert_eq!(check(&tx), Err(SlashingTxFault::OutputsExceedInput));
    }

    #[test]
    fn test_dust_change_rejected() {
        let mut tx = valid_tx();
        tx.output[1].value = Amount::from_sat(100);
        assert_eq!(check(&tx), Err(SlashingTxFault::DustOutput(1)));
    }

    #[test]
    fn test_build_rejects_oversized_fee() {
        assert_eq!(
            build_slashing_tx(
                funding(),
                Amount::from_sat(100_000),
                &params(),
                change(),
                Amount::from_sat(95_000)
            ),
            Err(SlashingTxFault::OutputsExceedInput)
        );
    }
}
