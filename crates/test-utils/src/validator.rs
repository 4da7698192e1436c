//! Registered validator fixtures.

use secp256k1::{PublicKey, SECP256K1};
use strata_btcstaking_state::{ProofOfPossession, Validator, ValidatorDescription};
use strata_crypto::{EvenPublicKey, EvenSecretKey};
use strata_params::Rate;

use crate::keys::keypair;

/// A validator whose proof of possession is valid for `btc`, with an account key drawn from
/// `account_seed`.
pub fn validator_fixture(
    btc: &(EvenSecretKey, EvenPublicKey),
    account_seed: u64,
    commission: Rate,
) -> Validator {
    let (account_sk, _) = keypair(account_seed);
    let account_pk = PublicKey::from_secret_key(SECP256K1, &account_sk);
    Validator::new(
        btc.1,
        account_pk.into(),
        ValidatorDescription {
            moniker: format!("validator-{account_seed}"),
            ..Default::default()
        },
        commission,
        ProofOfPossession::generate(&account_sk, &btc.0),
    )
}
