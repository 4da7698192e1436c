//! Transaction inclusion proofs against a Bitcoin block header.

use bitcoin::{
    Block, Target, Txid,
    block::Header,
    hashes::{Hash, sha256d},
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::InclusionError;

/// Merkle branch from a transaction to its block's merkle root.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Position of the transaction in the block.
    position: u32,

    /// Sibling hashes from the leaf level upwards.
    cohashes: Vec<[u8; 32]>,
}

impl InclusionProof {
    pub fn new(position: u32, cohashes: Vec<[u8; 32]>) -> Self {
        Self { position, cohashes }
    }

    /// Builds the proof for the transaction at `position` of `block`.
    pub fn from_block(block: &Block, position: u32) -> Option<Self> {
        if position as usize >= block.txdata.len() {
            return None;
        }

        let mut level: Vec<[u8; 32]> = block
            .txdata
            .iter()
            .map(|tx| tx.compute_txid().to_byte_array())
            .collect();
        let mut index = position as usize;
        let mut cohashes = Vec::new();

        while level.len() > 1 {
            // Odd levels pair the last node with itself.
            let sibling = if index % 2 == 0 {
                level.get(index + 1).unwrap_or(&level[index])
            } else {
                &level[index - 1]
            };
            cohashes.push(*sibling);

            level = level
                .chunks(2)
                .map(|pair| parent(&pair[0], pair.get(1).unwrap_or(&pair[0])))
                .collect();
            index /= 2;
        }

        Some(Self { position, cohashes })
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn cohashes(&self) -> &[[u8; 32]] {
        &self.cohashes
    }

    /// Folds the branch over `txid`, returning the implied merkle root.
    pub fn compute_root(&self, txid: &Txid) -> Result<[u8; 32], InclusionError> {
        let mut node = txid.to_byte_array();
        let mut index = self.position;
        for sibling in &self.cohashes {
            node = match index % 2 {
                0 => parent(&node, sibling),
                _ => parent(sibling, &node),
            };
            index /= 2;
        }
        if index != 0 {
            return Err(InclusionError::PositionOutOfRange {
                position: self.position,
                depth: self.cohashes.len(),
            });
        }
        Ok(node)
    }

    /// Checks that `txid` is committed to by `header` and that the header carries valid proof
    /// of work at a target no easier than `pow_limit`.
    pub fn verify(
        &self,
        txid: &Txid,
        header: &Header,
        pow_limit: Target,
    ) -> Result<(), InclusionError> {
        let target = header.target();
        if target > pow_limit {
            return Err(InclusionError::WorkBelowFloor);
        }
        header
            .validate_pow(target)
            .map_err(|_| InclusionError::InvalidPow)?;

        if self.compute_root(txid)? != header.merkle_root.to_byte_array() {
            return Err(InclusionError::MerkleRootMismatch);
        }
        Ok(())
    }
}

fn parent(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left);
    combined[32..].copy_from_slice(right);
    sha256d::Hash::hash(&combined).to_byte_array()
}

#[cfg(test)]
mod tests {
    use bitcoin::{
        Amount, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
        TxMerkleNode, TxOut, Witness, absolute::LockTime, block::Version as BlockVersion,
        transaction::Version,
    };

    use super::*;

    fn tx(seed: u32) -> Transaction {
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::new(Txid::all_zeros(), seed),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(u64::from(seed) + 1_000),
                script_pubkey: ScriptBuf::new(),
            }],
        }
    }

    /// A regtest-difficulty block over `n` transactions, with its nonce ground until valid.
    fn block(n: u32) -> Block {
        let txdata: Vec<_> = (0..n).map(tx).collect();
        let mut block = Block {
            header: Header {
                version: BlockVersion::TWO,
                prev_blockhash: BlockHash::all_zeros(),
                merkle_root: TxMerkleNode::all_zeros(),
                time: 1_700_000_000,
                bits: CompactTarget::from_consensus(0x207fffff),
                nonce: 0,
            },
            txdata,
        };
        block.header.merkle_root = block.compute_merkle_root().unwrap();
        while block.header.validate_pow(block.header.target()).is_err() {
            block.header.nonce += 1;
        }
        block
    }

    #[test]
    fn test_proofs_match_block_merkle_root() {
        for n in [1, 2, 3, 5, 8] {
            let block = block(n);
            for position in 0..n {
                let proof = InclusionProof::from_block(&block, position).unwrap();
                let txid = block.txdata[position as usize].compute_txid();
                proof
                    .verify(&txid, &block.header, Target::MAX_ATTAINABLE_REGTEST)
                    .unwrap();
            }
            assert!(InclusionProof::from_block(&block, n).is_none());
        }
    }

    #[test]
    fn test_wrong_tx_or_position_rejected() {
        let block = block(4);
        let proof = InclusionProof::from_block(&block, 1).unwrap();
        let other = block.txdata[2].compute_txid();
        assert_eq!(
            proof.verify(&other, &block.header, Target::MAX_ATTAINABLE_REGTEST),
            Err(InclusionError::MerkleRootMismatch)
        );

        let shifted = InclusionProof::new(8, proof.cohashes().to_vec());
        assert!(matches!(
            shifted.compute_root(&block.txdata[1].compute_txid()),
            Err(InclusionError::PositionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_pow_floor_and_validity() {
        let block = block(2);
        let proof = InclusionProof::from_block(&block, 0).unwrap();
        let txid = block.txdata[0].compute_txid();

        assert_eq!(
            proof.verify(&txid, &block.header, Target::MAX_ATTAINABLE_MAINNET),
            Err(InclusionError::WorkBelowFloor)
        );

        let mut header = block.header;
        // Find a nonce whose hash misses the target.
        while header.validate_pow(header.target()).is_ok() {
            header.nonce += 1;
        }
        assert_eq!(
            proof.verify(&txid, &header, Target::MAX_ATTAINABLE_REGTEST),
            Err(InclusionError::InvalidPow)
        );
    }
}
