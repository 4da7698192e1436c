//! Even parity key types for BIP340 Schnorr signatures.
//!
//! Taproot leaf scripts commit to 32-byte x-only keys, which always lift to the point with
//! even y. Signing with the matching secret therefore requires normalizing the secret so that
//! its public point has even parity.

use std::{
    cmp::Ordering,
    io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write},
    ops::Deref,
};

use arbitrary::{Arbitrary, Unstructured};
use borsh::{BorshDeserialize, BorshSerialize};
use secp256k1::{Parity, PublicKey, SECP256K1, SecretKey, XOnlyPublicKey};
use serde::{Deserialize, Serialize, de::Error as DeError};

/// Represents a secret key whose x-only public key has even parity.
///
/// Converting from a [`SecretKey`] negates the key when its x-only public key has odd parity,
/// so the resulting [`EvenSecretKey`] always yields even parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvenSecretKey(SecretKey);

impl EvenSecretKey {
    /// Returns the x-only public key of this secret.
    pub fn x_only(&self) -> XOnlyPublicKey {
        self.0.x_only_public_key(SECP256K1).0
    }
}

impl Deref for EvenSecretKey {
    type Target = SecretKey;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<SecretKey> for EvenSecretKey {
    fn from(value: SecretKey) -> Self {
        match value.x_only_public_key(SECP256K1).1 == Parity::Odd {
            true => Self(value.negate()),
            false => Self(value),
        }
    }
}

impl From<EvenSecretKey> for SecretKey {
    fn from(value: EvenSecretKey) -> Self {
        value.0
    }
}

/// Represents a public key whose x-only public key has even parity.
///
/// Converting from a [`PublicKey`] negates the key when its x-only public key has odd parity,
/// so the resulting [`EvenPublicKey`] always yields even parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvenPublicKey(PublicKey);

impl EvenPublicKey {
    /// Returns the 32-byte x-only form committed to by scripts and signatures.
    pub fn x_only(&self) -> XOnlyPublicKey {
        self.0.x_only_public_key().0
    }
}

/// Ordered by x-only serialization, the order keys take in multisig scripts.
impl Ord for EvenPublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x_only().serialize().cmp(&other.x_only().serialize())
    }
}

impl PartialOrd for EvenPublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Deref for EvenPublicKey {
    type Target = PublicKey;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<PublicKey> for EvenPublicKey {
    fn from(value: PublicKey) -> Self {
        match value.x_only_public_key().1 == Parity::Odd {
            true => Self(value.negate(SECP256K1)),
            false => Self(value),
        }
    }
}

impl From<EvenPublicKey> for PublicKey {
    fn from(value: EvenPublicKey) -> Self {
        value.0
    }
}

impl From<EvenPublicKey> for XOnlyPublicKey {
    fn from(value: EvenPublicKey) -> Self {
        value.0.x_only_public_key().0
    }
}

impl From<XOnlyPublicKey> for EvenPublicKey {
    fn from(value: XOnlyPublicKey) -> Self {
        PublicKey::from_x_only_public_key(value, Parity::Even).into()
    }
}

impl TryFrom<[u8; 32]> for EvenPublicKey {
    type Error = secp256k1::Error;

    fn try_from(value: [u8; 32]) -> Result<Self, Self::Error> {
        let x_only = XOnlyPublicKey::from_slice(&value)?;
        Ok(x_only.into())
    }
}

impl BorshSerialize for EvenPublicKey {
    fn serialize<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        let x_only = self.0.x_only_public_key().0;
        BorshSerialize::serialize(&x_only.serialize(), writer)
    }
}

impl BorshDeserialize for EvenPublicKey {
    fn deserialize_reader<R: Read>(reader: &mut R) -> IoResult<Self> {
        let buf = <[u8; 32]>::deserialize_reader(reader)?;
        EvenPublicKey::try_from(buf).map_err(|e| IoError::new(ErrorKind::InvalidData, e))
    }
}

impl Serialize for EvenPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Full compressed encoding, so the 0x02 prefix documents the parity.
        serializer.serialize_str(&hex::encode(self.0.serialize()))
    }
}

impl<'de> Deserialize<'de> for EvenPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_string).map_err(DeError::custom)?;
        let pk = PublicKey::from_slice(&bytes).map_err(DeError::custom)?;
        if pk.x_only_public_key().1 != Parity::Even {
            return Err(DeError::custom(
                "expected even parity public key, got odd parity",
            ));
        }
        Ok(EvenPublicKey(pk))
    }
}

impl<'a> Arbitrary<'a> for EvenPublicKey {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let sk_bytes: [u8; 32] = u.arbitrary()?;
        let sk = SecretKey::from_slice(&sk_bytes).map_err(|_| arbitrary::Error::IncorrectFormat)?;
        let pk = PublicKey::from_secret_key(SECP256K1, &sk);
        Ok(EvenPublicKey::from(pk))
    }
}

/// Ensures a keypair is even by checking the public key's parity and negating if odd.
pub fn even_kp((sk, pk): (SecretKey, PublicKey)) -> (EvenSecretKey, EvenPublicKey) {
    match (sk, pk) {
        (sk, pk) if pk.x_only_public_key().1 == Parity::Odd => (
            EvenSecretKey(sk.negate()),
            EvenPublicKey(pk.negate(SECP256K1)),
        ),
        (sk, pk) => (EvenSecretKey(sk), EvenPublicKey(pk)),
    }
}

#[cfg(test)]
mod tests {
    use secp256k1::{Parity, PublicKey, SECP256K1, SecretKey};

    use super::*;

    /// A secret whose public point has odd y.
    fn odd_secret() -> SecretKey {
        let sk = SecretKey::from_slice(&[0x01; 32]).unwrap();
        match sk.x_only_public_key(SECP256K1).1 {
            Parity::Odd => sk,
            Parity::Even => sk.negate(),
        }
    }

    #[test]
    fn test_odd_keys_are_normalized() {
        let sk = odd_secret();
        let pk = PublicKey::from_secret_key(SECP256K1, &sk);

        let even_sk = EvenSecretKey::from(sk);
        let even_pk = EvenPublicKey::from(pk);
        assert_eq!(*even_sk, sk.negate());
        assert_eq!(even_sk.x_only(), even_pk.x_only());
        assert_eq!(even_pk.x_only_public_key().1, Parity::Even);

        assert_eq!(even_kp((sk, pk)), (even_sk, even_pk));
    }

    #[test]
    fn test_x_only_lifts_to_same_key() {
        let pk = EvenPublicKey::from(PublicKey::from_secret_key(SECP256K1, &odd_secret()));
        let bytes = pk.x_only().serialize();
        assert_eq!(EvenPublicKey::try_from(bytes).unwrap(), pk);

        let decoded: EvenPublicKey = borsh::from_slice(&borsh::to_vec(&pk).unwrap()).unwrap();
        assert_eq!(decoded, pk);
    }

    #[test]
    fn test_json_rejects_odd_parity() {
        let sk = odd_secret();
        let odd = PublicKey::from_secret_key(SECP256K1, &sk);
        let json = format!("\"{}\"", hex::encode(odd.serialize()));
        assert!(serde_json::from_str::<EvenPublicKey>(&json).is_err());

        let even = EvenPublicKey::from(odd);
        let json = serde_json::to_string(&even).unwrap();
        assert!(json.starts_with("\"02"));
        assert_eq!(serde_json::from_str::<EvenPublicKey>(&json).unwrap(), even);
    }

    #[test]
    fn test_keys_sort_by_x_only_bytes() {
        let mut keys: Vec<EvenPublicKey> = (1u8..8)
            .map(|b| {
                let sk = SecretKey::from_slice(&[b; 32]).unwrap();
                PublicKey::from_secret_key(SECP256K1, &sk).into()
            })
            .collect();
        keys.sort();
        assert!(
            keys.windows(2)
                .all(|w| w[0].x_only().serialize() < w[1].x_only().serialize())
        );
    }
}
