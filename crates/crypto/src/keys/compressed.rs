//! Compressed ECDSA public key type.

use std::{
    io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write},
    ops::Deref,
};

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use secp256k1::{Error, PublicKey, SECP256K1, SecretKey};
use serde::{Deserialize, Serialize, de::Error as DeError};

/// A compressed secp256k1 public key (33 bytes) of any parity.
///
/// Used for the ECDSA account key of a validator, which unlike a BIP340 key has no
/// parity requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressedPublicKey(PublicKey);

impl CompressedPublicKey {
    /// The slice must be exactly 33 bytes with a 0x02 or 0x03 prefix.
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 33 {
            return Err(Error::InvalidPublicKey);
        }
        Ok(Self(PublicKey::from_slice(data)?))
    }

    pub fn as_inner(&self) -> &PublicKey {
        &self.0
    }

    pub fn serialize(&self) -> [u8; 33] {
        self.0.serialize()
    }
}

impl Deref for CompressedPublicKey {
    type Target = PublicKey;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<PublicKey> for CompressedPublicKey {
    fn from(pk: PublicKey) -> Self {
        Self(pk)
    }
}

impl From<CompressedPublicKey> for PublicKey {
    fn from(pk: CompressedPublicKey) -> Self {
        pk.0
    }
}

impl BorshSerialize for CompressedPublicKey {
    fn serialize<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_all(&self.0.serialize())
    }
}

impl BorshDeserialize for CompressedPublicKey {
    fn deserialize_reader<R: Read>(reader: &mut R) -> IoResult<Self> {
        let mut buf = [0u8; 33];
        reader.read_exact(&mut buf)?;
        Self::from_slice(&buf).map_err(|e| IoError::new(ErrorKind::InvalidData, e))
    }
}

impl<'a> Arbitrary<'a> for CompressedPublicKey {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let mut sk_bytes = [0u8; 32];
        u.fill_buffer(&mut sk_bytes)?;
        if sk_bytes.iter().all(|&b| b == 0) {
            sk_bytes[31] = 1;
        }
        let sk = SecretKey::from_slice(&sk_bytes).map_err(|_| arbitrary::Error::IncorrectFormat)?;
        Ok(Self(PublicKey::from_secret_key(SECP256K1, &sk)))
    }
}

impl Serialize for CompressedPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0.serialize()))
    }
}

impl<'de> Deserialize<'de> for CompressedPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_string).map_err(DeError::custom)?;
        Self::from_slice(&bytes).map_err(DeError::custom)
    }
}
