//! Tapscript sighashes and the signatures made over them.
//!
//! Every transaction in the protocol spends a single staking (or unbonding) output, so all
//! helpers here sign input 0 with `SIGHASH_DEFAULT`.

use bitcoin::{
    Script, TapLeafHash, Transaction, TxOut, XOnlyPublicKey,
    hashes::Hash,
    secp256k1::{SecretKey, schnorr::Signature},
    sighash::{Prevouts, SighashCache, TapSighashType},
    taproot::LeafVersion,
};
use strata_crypto::{
    AdaptorSignature, EncryptionKey,
    schnorr::{sign_schnorr_sig, verify_schnorr_sig},
};

use crate::errors::StakingTxError;

/// BIP341 script-path sighash of input 0 of `tx`, spending `prevout` through `leaf`.
pub fn tapscript_sighash(
    tx: &Transaction,
    prevout: &TxOut,
    leaf: &Script,
) -> Result<[u8; 32], StakingTxError> {
    if tx.input.is_empty() {
        return Err(StakingTxError::MissingInput(0));
    }
    let mut cache = SighashCache::new(tx);
    let sighash = cache.taproot_script_spend_signature_hash(
        0,
        &Prevouts::All(&[prevout]),
        TapLeafHash::from_script(leaf, LeafVersion::TapScript),
        TapSighashType::Default,
    )?;
    Ok(sighash.to_byte_array())
}

/// Signs the spend of `prevout` through `leaf`.
pub fn sign_spend(
    tx: &Transaction,
    prevout: &TxOut,
    leaf: &Script,
    sk: &SecretKey,
) -> Result<Signature, StakingTxError> {
    let sighash = tapscript_sighash(tx, prevout, leaf)?;
    Ok(sign_schnorr_sig(&sighash, sk))
}

/// Verifies a plain signature on the spend of `prevout` through `leaf`.
pub fn verify_spend_sig(
    tx: &Transaction,
    prevout: &TxOut,
    leaf: &Script,
    pk: &XOnlyPublicKey,
    sig: &Signature,
) -> Result<(), StakingTxError> {
    let sighash = tapscript_sighash(tx, prevout, leaf)?;
    if !verify_schnorr_sig(sig, &sighash, pk) {
        return Err(StakingTxError::InvalidSignature);
    }
    Ok(())
}

/// Produces an adaptor signature on the spend, encrypted under `ek`.
pub fn enc_sign_spend(
    tx: &Transaction,
    prevout: &TxOut,
    leaf: &Script,
    sk: &SecretKey,
    ek: &EncryptionKey,
) -> Result<AdaptorSignature, StakingTxError> {
    let sighash = tapscript_sighash(tx, prevout, leaf)?;
    Ok(AdaptorSignature::enc_sign(&sighash, sk, ek)?)
}

/// Verifies an adaptor signature on the spend against the signer key and `ek`.
pub fn verify_spend_adaptor_sig(
    tx: &Transaction,
    prevout: &TxOut,
    leaf: &Script,
    pk: &XOnlyPublicKey,
    ek: &EncryptionKey,
    sig: &AdaptorSignature,
) -> Result<(), StakingTxError> {
    let sighash = tapscript_sighash(tx, prevout, leaf)?;
    sig.verify(&sighash, pk, ek)?;
    Ok(())
}
