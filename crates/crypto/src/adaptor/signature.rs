use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write};

use borsh::{BorshDeserialize, BorshSerialize};
use secp256k1::{
    Parity, PublicKey, SECP256K1, Scalar, SecretKey, XOnlyPublicKey, constants::CURVE_ORDER,
    schnorr::Signature,
};
use serde::{Deserialize, Serialize, de::Error as DeError};
use zeroize::Zeroize;

use super::{AdaptorError, DecryptionKey, EncryptionKey};
use crate::{keys::even::EvenSecretKey, schnorr::tagged_hash};

/// Serialized size of an [`AdaptorSignature`].
pub const ADAPTOR_SIGNATURE_SIZE: usize = 66;

const NONCE_TAG: &[u8] = b"strata/adaptor/nonce";
const CHALLENGE_TAG: &[u8] = b"BIP0340/challenge";

/// A Schnorr adaptor signature, encrypted under an [`EncryptionKey`].
///
/// The nonce point `R̂ = k·G + T` carries the encryption key. When `R̂` has odd y the final
/// BIP340 nonce is `-R̂`, so the secret nonce is negated at signing time and
/// `needs_negation` records it. Decryption then subtracts the decryption key instead of
/// adding it.
///
/// Wire format: `R̂` compressed (33 bytes) || `ŝ` (32 bytes) || negation flag (1 byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptorSignature {
    r_hat: PublicKey,
    s_hat: SecretKey,
    needs_negation: bool,
}

impl AdaptorSignature {
    /// Produces an adaptor signature over `msg` with `sk`, encrypted under `ek`.
    ///
    /// The nonce is derived from the secret key, the encryption key and the message, so the
    /// same inputs always yield the same signature.
    pub fn enc_sign(
        msg: &[u8; 32],
        sk: &SecretKey,
        ek: &EncryptionKey,
    ) -> Result<Self, AdaptorError> {
        let x = EvenSecretKey::from(*sk);
        let pk = x.x_only();
        let t = ek.as_public_key();

        let mut sk_bytes = x.secret_bytes();
        let t_bytes = t.serialize();
        let mut counter: u32 = 0;
        let (k0, r_hat) = loop {
            let mut nonce = tagged_hash(
                NONCE_TAG,
                &[&sk_bytes, &t_bytes, msg, &counter.to_be_bytes()],
            );
            let candidate = SecretKey::from_slice(&nonce);
            nonce.zeroize();
            counter = counter.checked_add(1).ok_or(AdaptorError::Degenerate)?;

            let Ok(k0) = candidate else { continue };
            let k0_point = PublicKey::from_secret_key(SECP256K1, &k0);
            if let Ok(r_hat) = k0_point.combine(t) {
                break (k0, r_hat);
            }
        };
        sk_bytes.zeroize();

        let needs_negation = r_hat.x_only_public_key().1 == Parity::Odd;
        let k = if needs_negation { k0.negate() } else { k0 };

        let e = challenge(&r_hat, &pk, msg)?;
        let s_hat = (*x)
            .mul_tweak(&e)
            .and_then(|ex| ex.add_tweak(&Scalar::from(k)))
            .map_err(|_| AdaptorError::Degenerate)?;

        Ok(Self {
            r_hat,
            s_hat,
            needs_negation,
        })
    }

    /// Checks the signature against `msg`, the signer's x-only key and the encryption key.
    ///
    /// Does not need the decryption key.
    pub fn verify(
        &self,
        msg: &[u8; 32],
        pk: &XOnlyPublicKey,
        ek: &EncryptionKey,
    ) -> Result<(), AdaptorError> {
        if self.needs_negation != (self.r_hat.x_only_public_key().1 == Parity::Odd) {
            return Err(AdaptorError::AdaptorVerificationFailed);
        }

        let p = PublicKey::from_x_only_public_key(*pk, Parity::Even);
        let t = ek.as_public_key();
        let e = challenge(&self.r_hat, pk, msg)?;

        // ŝ·G must equal ±(R̂ - T) + e·P.
        let expected = {
            let nonce_part = if self.needs_negation {
                t.combine(&self.r_hat.negate(SECP256K1))
            } else {
                self.r_hat.combine(&t.negate(SECP256K1))
            };
            let ep = p.mul_tweak(SECP256K1, &e);
            nonce_part
                .and_then(|r| ep.and_then(|ep| r.combine(&ep)))
                .map_err(|_| AdaptorError::AdaptorVerificationFailed)?
        };

        let actual = PublicKey::from_secret_key(SECP256K1, &self.s_hat);
        if actual != expected {
            return Err(AdaptorError::AdaptorVerificationFailed);
        }
        Ok(())
    }

    /// Applies the decryption key, producing a standard BIP340 signature.
    pub fn decrypt(&self, dk: &DecryptionKey) -> Result<Signature, AdaptorError> {
        let t = if self.needs_negation {
            dk.as_secret_key().negate()
        } else {
            *dk.as_secret_key()
        };
        let s = self
            .s_hat
            .add_tweak(&Scalar::from(t))
            .map_err(|_| AdaptorError::Degenerate)?;

        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r_hat.x_only_public_key().0.serialize());
        bytes[32..].copy_from_slice(&s.secret_bytes());
        Signature::from_slice(&bytes).map_err(|_| AdaptorError::Degenerate)
    }

    /// Extracts the decryption key from a final signature that was decrypted from `self`.
    pub fn recover_decryption_key(&self, sig: &Signature) -> Result<DecryptionKey, AdaptorError> {
        let sig_bytes = sig.serialize();
        if sig_bytes[..32] != self.r_hat.x_only_public_key().0.serialize() {
            return Err(AdaptorError::NonceMismatch);
        }
        let s = SecretKey::from_slice(&sig_bytes[32..]).map_err(|_| AdaptorError::InvalidScalar)?;

        let t = if self.needs_negation {
            self.s_hat.add_tweak(&Scalar::from(s.negate()))
        } else {
            s.add_tweak(&Scalar::from(self.s_hat.negate()))
        }
        .map_err(|_| AdaptorError::Degenerate)?;

        Ok(DecryptionKey(t))
    }

    pub fn needs_negation(&self) -> bool {
        self.needs_negation
    }

    pub fn to_bytes(&self) -> [u8; ADAPTOR_SIGNATURE_SIZE] {
        let mut out = [0u8; ADAPTOR_SIGNATURE_SIZE];
        out[..33].copy_from_slice(&self.r_hat.serialize());
        out[33..65].copy_from_slice(&self.s_hat.secret_bytes());
        out[65] = u8::from(self.needs_negation);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AdaptorError> {
        if bytes.len() != ADAPTOR_SIGNATURE_SIZE {
            return Err(AdaptorError::InvalidLength {
                expected: ADAPTOR_SIGNATURE_SIZE,
                got: bytes.len(),
            });
        }

        let r_hat =
            PublicKey::from_slice(&bytes[..33]).map_err(|_| AdaptorError::InvalidNoncePoint)?;
        let s_hat =
            SecretKey::from_slice(&bytes[33..65]).map_err(|_| AdaptorError::InvalidScalar)?;
        let flag = bytes[65];
        let needs_negation = match flag {
            0 => false,
            1 => true,
            other => return Err(AdaptorError::InvalidNegationFlag(other)),
        };
        if needs_negation != (r_hat.x_only_public_key().1 == Parity::Odd) {
            return Err(AdaptorError::InvalidNegationFlag(flag));
        }

        Ok(Self {
            r_hat,
            s_hat,
            needs_negation,
        })
    }
}

/// BIP340 challenge `e = H(R.x || P.x || m) mod n`.
fn challenge(
    r_hat: &PublicKey,
    pk: &XOnlyPublicKey,
    msg: &[u8; 32],
) -> Result<Scalar, AdaptorError> {
    let rx = r_hat.x_only_public_key().0.serialize();
    let hash = tagged_hash(CHALLENGE_TAG, &[&rx, &pk.serialize(), msg]);
    Scalar::from_be_bytes(reduce_mod_order(hash)).map_err(|_| AdaptorError::Degenerate)
}

/// Reduces a 256-bit big-endian integer modulo the curve order.
///
/// One subtraction suffices since `2^256 < 2n`.
fn reduce_mod_order(mut bytes: [u8; 32]) -> [u8; 32] {
    if bytes < CURVE_ORDER {
        return bytes;
    }
    let mut borrow = 0u16;
    for i in (0..32).rev() {
        let lhs = u16::from(bytes[i]);
        let rhs = u16::from(CURVE_ORDER[i]) + borrow;
        if lhs >= rhs {
            bytes[i] = (lhs - rhs) as u8;
            borrow = 0;
        } else {
            bytes[i] = (lhs + 256 - rhs) as u8;
            borrow = 1;
        }
    }
    bytes
}

impl BorshSerialize for AdaptorSignature {
    fn serialize<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_all(&self.to_bytes())
    }
}

impl BorshDeserialize for AdaptorSignature {
    fn deserialize_reader<R: Read>(reader: &mut R) -> IoResult<Self> {
        let mut buf = [0u8; ADAPTOR_SIGNATURE_SIZE];
        reader.read_exact(&mut buf)?;
        Self::from_bytes(&buf).map_err(|e| IoError::new(ErrorKind::InvalidData, e))
    }
}

impl Serialize for AdaptorSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for AdaptorSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string: String = Deserialize::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_string).map_err(DeError::custom)?;
        Self::from_bytes(&bytes).map_err(DeError::custom)
    }
}
