//! Proof that one party controls both a validator's account key and its BTC key.
//!
//! The account key signs `SHA256(btc_pk)` with ECDSA, then the BTC key signs
//! `SHA256(account_sig)` with BIP340. Chaining the two binds each key to the other.

use borsh::{BorshDeserialize, BorshSerialize};
use secp256k1::{PublicKey, SECP256K1, SecretKey, XOnlyPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strata_crypto::{
    EcdsaSig, SchnorrSig,
    ecdsa::{sign_ecdsa_sha256, verify_ecdsa_sha256},
    schnorr::{sign_schnorr_sig, verify_schnorr_sig},
};

use crate::errors::PopError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ProofOfPossession {
    account_sig: EcdsaSig,
    btc_sig: SchnorrSig,
}

impl ProofOfPossession {
    pub fn new(account_sig: EcdsaSig, btc_sig: SchnorrSig) -> Self {
        Self {
            account_sig,
            btc_sig,
        }
    }

    /// Produces the proof for the key pair `(account_sk, btc_sk)`.
    pub fn generate(account_sk: &SecretKey, btc_sk: &SecretKey) -> Self {
        let btc_pk = btc_sk.x_only_public_key(SECP256K1).0;
        let account_sig = EcdsaSig::from(sign_ecdsa_sha256(&btc_pk.serialize(), account_sk));
        let digest = btc_sig_digest(&account_sig);
        let btc_sig = SchnorrSig::from(sign_schnorr_sig(&digest, btc_sk));
        Self {
            account_sig,
            btc_sig,
        }
    }

    pub fn verify(&self, account_pk: &PublicKey, btc_pk: &XOnlyPublicKey) -> Result<(), PopError> {
        if !verify_ecdsa_sha256(self.account_sig.as_inner(), &btc_pk.serialize(), account_pk) {
            return Err(PopError::InvalidAccountSig);
        }
        let digest = btc_sig_digest(&self.account_sig);
        if !verify_schnorr_sig(&self.btc_sig, &digest, btc_pk) {
            return Err(PopError::InvalidBtcSig);
        }
        Ok(())
    }

    pub fn account_sig(&self) -> &EcdsaSig {
        &self.account_sig
    }

    pub fn btc_sig(&self) -> &SchnorrSig {
        &self.btc_sig
    }
}

fn btc_sig_digest(account_sig: &EcdsaSig) -> [u8; 32] {
    Sha256::digest(account_sig.to_compact()).into()
}
