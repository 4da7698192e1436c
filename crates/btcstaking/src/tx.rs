use arbitrary::{Arbitrary, Unstructured};
use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
    absolute::LockTime,
    consensus::{deserialize, serialize},
    hashes::Hash,
    transaction::Version,
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::StakingTxError;

/// A consensus-encoded Bitcoin transaction, kept as the exact bytes it was received as.
///
/// Only canonical encodings are accepted, so re-serializing the parsed transaction always gives
/// back the stored bytes and the txid is recomputable from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RawBitcoinTx(Vec<u8>);

impl RawBitcoinTx {
    /// Parses and checks that `bytes` is the canonical encoding of a transaction.
    pub fn try_from_bytes(bytes: Vec<u8>) -> Result<Self, StakingTxError> {
        let tx: Transaction = deserialize(&bytes)?;
        if serialize(&tx) != bytes {
            return Err(StakingTxError::NonCanonicalEncoding);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_tx(&self) -> Result<Transaction, StakingTxError> {
        Ok(deserialize(&self.0)?)
    }

    pub fn txid(&self) -> Result<Txid, StakingTxError> {
        Ok(self.to_tx()?.compute_txid())
    }
}

impl From<&Transaction> for RawBitcoinTx {
    fn from(value: &Transaction) -> Self {
        Self(serialize(value))
    }
}

impl From<Transaction> for RawBitcoinTx {
    fn from(value: Transaction) -> Self {
        Self(serialize(&value))
    }
}

impl TryFrom<&RawBitcoinTx> for Transaction {
    type Error = StakingTxError;

    fn try_from(value: &RawBitcoinTx) -> Result<Self, Self::Error> {
        value.to_tx()
    }
}

/// Returns output `index` of `tx`.
pub fn tx_output(tx: &Transaction, index: u32) -> Result<&TxOut, StakingTxError> {
    tx.output
        .get(index as usize)
        .ok_or(StakingTxError::MissingOutput(index))
}

impl<'a> Arbitrary<'a> for RawBitcoinTx {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        // At least one input, so the encoding never hits the empty-input segwit ambiguity.
        let input_count = u.int_in_range::<usize>(1..=3)?;
        let output_count = u.int_in_range::<usize>(1..=3)?;

        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let mut txid_bytes = [0u8; 32];
            u.fill_buffer(&mut txid_bytes)?;
            inputs.push(TxIn {
                previous_output: OutPoint {
                    txid: Txid::from_byte_array(txid_bytes),
                    vout: u32::arbitrary(u)?,
                },
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            });
        }

        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let script_len = u.int_in_range::<usize>(0..=40)?;
            outputs.push(TxOut {
                value: Amount::from_sat(u.int_in_range(0..=Amount::MAX_MONEY.to_sat())?),
                script_pubkey: ScriptBuf::from_bytes(u.bytes(script_len)?.to_vec()),
            });
        }

        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: inputs,
            output: outputs,
        };
        Ok(tx.into())
    }
}

#[cfg(test)]
mod tests {
    use arbitrary::Unstructured;

    use super::*;

    #[test]
    fn test_raw_tx_roundtrip_is_byte_exact() {
        let data: Vec<u8> = (0..=255u8).cycle().take(8192).collect();
        let mut u = Unstructured::new(&data);
        for _ in 0..8 {
            let raw = RawBitcoinTx::arbitrary(&mut u).unwrap();
            let reparsed = RawBitcoinTx::try_from_bytes(raw.as_bytes().to_vec()).unwrap();
            assert_eq!(raw, reparsed);
            let tx = raw.to_tx().unwrap();
            assert_eq!(RawBitcoinTx::from(&tx), raw);
            assert_eq!(raw.txid().unwrap(), tx.compute_txid());
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let data = [7u8; 512];
        let raw = RawBitcoinTx::arbitrary(&mut Unstructured::new(&data)).unwrap();
        let mut bytes = raw.as_bytes().to_vec();
        bytes.push(0);
        assert!(matches!(
            RawBitcoinTx::try_from_bytes(bytes),
            Err(StakingTxError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_output() {
        let data = [3u8; 512];
        let tx = RawBitcoinTx::arbitrary(&mut Unstructured::new(&data))
            .unwrap()
            .to_tx()
            .unwrap();
        assert!(tx_output(&tx, 0).is_ok());
        assert!(matches!(
            tx_output(&tx, 99),
            Err(StakingTxError::MissingOutput(99))
        ));
    }
}
