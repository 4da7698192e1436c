use bitcoin::{Network, Target, Txid, block::Header, params::Params};
use strata_btcstaking::{InclusionError, InclusionProof};

use crate::traits::InclusionVerifier;

/// Verifies merkle inclusion proofs and rejects headers whose target is easier than
/// `pow_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpvVerifier {
    pow_limit: Target,
}

impl SpvVerifier {
    pub fn new(pow_limit: Target) -> Self {
        Self { pow_limit }
    }

    /// Uses the easiest target `network` allows as the floor.
    pub fn for_network(network: Network) -> Self {
        Self::new(Params::new(network).max_attainable_target)
    }

    pub fn pow_limit(&self) -> Target {
        self.pow_limit
    }
}

impl InclusionVerifier for SpvVerifier {
    fn verify_inclusion(
        &self,
        txid: &Txid,
        header: &Header,
        proof: &InclusionProof,
    ) -> Result<(), InclusionError> {
        proof.verify(txid, header, self.pow_limit)
    }
}
