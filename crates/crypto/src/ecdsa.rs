//! ECDSA helpers over SHA-256 digests, used for account-key proofs.

use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write};

use borsh::{BorshDeserialize, BorshSerialize};
use secp256k1::{Message, PublicKey, SECP256K1, SecretKey, ecdsa::Signature};
use serde::{Deserialize, Serialize, de::Error as DeError};
use sha2::{Digest, Sha256};

/// Signs `SHA256(data)` with a low-S ECDSA signature.
pub fn sign_ecdsa_sha256(data: &[u8], sk: &SecretKey) -> Signature {
    let digest: [u8; 32] = Sha256::digest(data).into();
    SECP256K1.sign_ecdsa(&Message::from_digest(digest), sk)
}

/// Verifies an ECDSA signature over `SHA256(data)`.
pub fn verify_ecdsa_sha256(sig: &Signature, data: &[u8], pk: &PublicKey) -> bool {
    let digest: [u8; 32] = Sha256::digest(data).into();
    SECP256K1
        .verify_ecdsa(&Message::from_digest(digest), sig, pk)
        .is_ok()
}

/// An ECDSA signature in 64-byte compact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcdsaSig(Signature);

impl EcdsaSig {
    pub fn from_compact(bytes: &[u8]) -> Result<Self, secp256k1::Error> {
        Ok(Self(Signature::from_compact(bytes)?))
    }

    pub fn to_compact(&self) -> [u8; 64] {
        self.0.serialize_compact()
    }

    pub fn as_inner(&self) -> &Signature {
        &self.0
    }
}

impl From<Signature> for EcdsaSig {
    fn from(value: Signature) -> Self {
        Self(value)
    }
}

impl BorshSerialize for EcdsaSig {
    fn serialize<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_all(&self.to_compact())
    }
}

impl BorshDeserialize for EcdsaSig {
    fn deserialize_reader<R: Read>(reader: &mut R) -> IoResult<Self> {
        let mut buf = [0u8; 64];
        reader.read_exact(&mut buf)?;
        Self::from_compact(&buf).map_err(|e| IoError::new(ErrorKind::InvalidData, e))
    }
}

impl Serialize for EcdsaSig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.to_compact()))
    }
}

impl<'de> Deserialize<'de> for EcdsaSig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_string).map_err(DeError::custom)?;
        Self::from_compact(&bytes).map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use secp256k1::{PublicKey, SECP256K1, SecretKey};

    use super::*;

    #[test]
    fn test_ecdsa_sign_verify() {
        let sk = SecretKey::from_slice(&[0x07; 32]).unwrap();
        let pk = PublicKey::from_secret_key(SECP256K1, &sk);

        let sig = sign_ecdsa_sha256(b"payload", &sk);
        assert!(verify_ecdsa_sha256(&sig, b"payload", &pk));
        assert!(!verify_ecdsa_sha256(&sig, b"other payload", &pk));

        let wrapped = EcdsaSig::from(sig);
        let decoded: EcdsaSig = borsh::from_slice(&borsh::to_vec(&wrapped).unwrap()).unwrap();
        assert_eq!(decoded.as_inner(), &sig);
    }
}
