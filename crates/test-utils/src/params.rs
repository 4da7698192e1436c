//! Parameter fixtures.

use bitcoin::{Amount, ScriptBuf};
use secp256k1::SECP256K1;
use strata_crypto::EvenPublicKey;
use strata_params::{ParamsHistory, Rate, StakingParams};

use crate::keys::keypair;

/// Seed of the key the fixture slashing script pays to.
const SLASHING_KEY_SEED: u64 = 0x5a5a;

pub const SLASHING_RATE_BPS: u16 = 1_000;
pub const MIN_COMMISSION_BPS: u16 = 500;
pub const MIN_SLASHING_TX_FEE_SAT: u64 = 1_000;
pub const MAX_UNBONDING_FEE_SAT: u64 = 10_000;

/// Output script of the fixture slashing destination.
pub fn slashing_pk_script() -> ScriptBuf {
    let (_, pk) = keypair(SLASHING_KEY_SEED);
    ScriptBuf::new_p2tr(SECP256K1, pk.x_only(), None)
}

/// Parameters with the given committee and quorum, and fixed economics.
pub fn test_params(covenants: &[EvenPublicKey], quorum: u32) -> StakingParams {
    StakingParams {
        covenant_pks: covenants.to_vec(),
        covenant_quorum: quorum,
        slashing_pk_script: slashing_pk_script(),
        slashing_rate: Rate::from_bps(SLASHING_RATE_BPS).expect("valid rate"),
        min_slashing_tx_fee: Amount::from_sat(MIN_SLASHING_TX_FEE_SAT),
        min_commission_rate: Rate::from_bps(MIN_COMMISSION_BPS).expect("valid rate"),
        max_active_validators: 100,
        max_unbonding_fee: Amount::from_sat(MAX_UNBONDING_FEE_SAT),
    }
}

/// A history holding `params` from genesis.
pub fn params_history(params: StakingParams) -> ParamsHistory {
    let mut history = ParamsHistory::new();
    history.push(0, params).expect("valid fixture params");
    history
}
