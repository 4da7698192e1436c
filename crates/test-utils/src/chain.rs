//! A mined regtest chain standing in for a Bitcoin light client.

use bitcoin::{
    Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
    TxMerkleNode, TxOut, Txid, Witness, absolute::LockTime, block::Header,
    block::Version as BlockVersion, hashes::Hash, script::Builder, transaction::Version,
};
use strata_btcstaking::InclusionProof;

/// Compact form of the regtest proof of work limit.
const REGTEST_BITS: u32 = 0x207f_ffff;
const GENESIS_TIME: u32 = 1_700_000_000;
const BLOCK_INTERVAL: u32 = 600;

/// Blocks with real (regtest difficulty) proof of work and correct merkle roots.
#[derive(Debug, Clone)]
pub struct TestChain {
    blocks: Vec<Block>,
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TestChain {
    /// A chain holding only a genesis block at height 0.
    pub fn new() -> Self {
        let genesis = mine_block(BlockHash::all_zeros(), 0, vec![]);
        Self {
            blocks: vec![genesis],
        }
    }

    pub fn tip_height(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    pub fn tip_hash(&self) -> BlockHash {
        self.blocks[self.blocks.len() - 1].block_hash()
    }

    /// Mines a block holding a coinbase followed by `txs`.
    pub fn mine(&mut self, txs: Vec<Transaction>) -> &Block {
        let height = self.tip_height() + 1;
        let block = mine_block(self.tip_hash(), height, txs);
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn mine_empty(&mut self, count: u64) {
        for _ in 0..count {
            self.mine(vec![]);
        }
    }

    pub fn block_at(&self, height: u64) -> Option<&Block> {
        self.blocks.get(height as usize)
    }

    pub fn header_at_hash(&self, hash: &BlockHash) -> Option<(u64, Header)> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, b)| &b.block_hash() == hash)
            .map(|(height, b)| (height as u64, b.header))
    }

    /// Locates `txid` and returns its block hash with the inclusion proof.
    pub fn inclusion_proof(&self, txid: &Txid) -> Option<(BlockHash, InclusionProof)> {
        self.blocks.iter().find_map(|block| {
            let position = block
                .txdata
                .iter()
                .position(|tx| &tx.compute_txid() == txid)?;
            let proof = InclusionProof::from_block(block, position as u32)?;
            Some((block.block_hash(), proof))
        })
    }
}

fn coinbase(height: u64) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: Builder::new().push_int(height as i64).into_script(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(50 * 100_000_000),
            script_pubkey: ScriptBuf::new(),
        }],
    }
}

fn mine_block(prev_blockhash: BlockHash, height: u64, txs: Vec<Transaction>) -> Block {
    let mut txdata = vec![coinbase(height)];
    txdata.extend(txs);

    let mut block = Block {
        header: Header {
            version: BlockVersion::TWO,
            prev_blockhash,
            merkle_root: TxMerkleNode::all_zeros(),
            time: GENESIS_TIME + height as u32 * BLOCK_INTERVAL,
            bits: CompactTarget::from_consensus(REGTEST_BITS),
            nonce: 0,
        },
        txdata,
    };
    block.header.merkle_root = block
        .compute_merkle_root()
        .expect("block has a coinbase");
    while block.header.validate_pow(block.header.target()).is_err() {
        block.header.nonce += 1;
    }
    block
}
