//! Schnorr signature signing and verification.

use std::{
    io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write},
    ops::Deref,
};

use borsh::{BorshDeserialize, BorshSerialize};
use secp256k1::{Keypair, Message, SECP256K1, SecretKey, XOnlyPublicKey, schnorr::Signature};
use serde::{Deserialize, Serialize, de::Error as DeError};
use sha2::{Digest, Sha256};

/// Computes a BIP340 tagged hash, `SHA256(SHA256(tag) || SHA256(tag) || data)`.
pub fn tagged_hash(tag: &[u8], data: &[&[u8]]) -> [u8; 32] {
    let tag_hash = Sha256::digest(tag);
    let mut hasher = Sha256::new();
    hasher.update(tag_hash);
    hasher.update(tag_hash);
    for chunk in data {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

/// Sign a 32-byte digest with a BIP340 Schnorr signature.
///
/// The nonce is derived without auxiliary randomness, so signing is reproducible.
pub fn sign_schnorr_sig(msg: &[u8; 32], sk: &SecretKey) -> Signature {
    let kp = Keypair::from_secret_key(SECP256K1, sk);
    let msg = Message::from_digest(*msg);
    SECP256K1.sign_schnorr_no_aux_rand(&msg, &kp)
}

/// Verify a BIP340 Schnorr signature over a 32-byte digest.
pub fn verify_schnorr_sig(sig: &Signature, msg: &[u8; 32], pk: &XOnlyPublicKey) -> bool {
    let msg = Message::from_digest(*msg);
    SECP256K1.verify_schnorr(sig, &msg, pk).is_ok()
}

/// A 64-byte BIP340 signature with borsh and hex serde encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchnorrSig(Signature);

impl SchnorrSig {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, secp256k1::Error> {
        Ok(Self(Signature::from_slice(bytes)?))
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.serialize()
    }
}

impl Deref for SchnorrSig {
    type Target = Signature;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Signature> for SchnorrSig {
    fn from(value: Signature) -> Self {
        Self(value)
    }
}

impl From<SchnorrSig> for Signature {
    fn from(value: SchnorrSig) -> Self {
        value.0
    }
}

impl BorshSerialize for SchnorrSig {
    fn serialize<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_all(&self.0.serialize())
    }
}

impl BorshDeserialize for SchnorrSig {
    fn deserialize_reader<R: Read>(reader: &mut R) -> IoResult<Self> {
        let mut buf = [0u8; 64];
        reader.read_exact(&mut buf)?;
        Self::from_slice(&buf).map_err(|e| IoError::new(ErrorKind::InvalidData, e))
    }
}

impl Serialize for SchnorrSig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0.serialize()))
    }
}

impl<'de> Deserialize<'de> for SchnorrSig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_string).map_err(DeError::custom)?;
        Self::from_slice(&bytes).map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, rngs::OsRng};
    use secp256k1::{SECP256K1, SecretKey};

    use super::{SchnorrSig, sign_schnorr_sig, tagged_hash, verify_schnorr_sig};

    #[test]
    fn test_schnorr_signature_pass() {
        let msg: [u8; 32] = [(); 32].map(|_| OsRng.r#gen());

        let mut mod_msg = msg;
        mod_msg.swap(1, 2);

        let mut sk_bytes = [0u8; 32];
        OsRng.fill(&mut sk_bytes);
        let sk = SecretKey::from_slice(&sk_bytes).expect("valid key");
        let (pk, _) = sk.x_only_public_key(SECP256K1);

        let sig = sign_schnorr_sig(&msg, &sk);
        assert!(verify_schnorr_sig(&sig, &msg, &pk));

        if mod_msg != msg {
            assert!(!verify_schnorr_sig(&sig, &mod_msg, &pk));
        }

        let sig = sign_schnorr_sig(&mod_msg, &sk);
        assert!(verify_schnorr_sig(&sig, &mod_msg, &pk));
    }

    #[test]
    fn test_schnorr_signing_is_deterministic() {
        let sk = SecretKey::from_slice(&[0x11; 32]).expect("valid key");
        let msg = [0x42; 32];
        assert_eq!(sign_schnorr_sig(&msg, &sk), sign_schnorr_sig(&msg, &sk));
    }

    #[test]
    fn test_schnorr_sig_encodings() {
        let sk = SecretKey::from_slice(&[0x12; 32]).expect("valid key");
        let sig = SchnorrSig::from(sign_schnorr_sig(&[1; 32], &sk));

        let encoded = borsh::to_vec(&sig).expect("borsh encode");
        assert_eq!(encoded.len(), 64);
        let decoded: SchnorrSig = borsh::from_slice(&encoded).expect("borsh decode");
        assert_eq!(sig, decoded);

        let json = serde_json::to_string(&sig).expect("serde encode");
        assert_eq!(json.len(), 128 + 2);
        let from_json: SchnorrSig = serde_json::from_str(&json).expect("serde decode");
        assert_eq!(sig, from_json);
    }

    #[test]
    fn test_tagged_hash_splits_data_transparently() {
        let whole = tagged_hash(b"tag", &[b"hello world"]);
        let split = tagged_hash(b"tag", &[b"hello", b" ", b"world"]);
        assert_eq!(whole, split);
        assert_ne!(whole, tagged_hash(b"other", &[b"hello world"]));
    }
}
