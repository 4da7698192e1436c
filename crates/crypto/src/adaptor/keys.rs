use std::fmt;

use secp256k1::{Parity, PublicKey, SECP256K1, SecretKey, XOnlyPublicKey};

use super::AdaptorError;
use crate::keys::even::EvenSecretKey;

/// Public point an adaptor signature is encrypted under.
///
/// Always the even-y point, so that it equals [`DecryptionKey::encryption_key`] of the secret
/// it was derived from. In staking this is a validator's BTC key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncryptionKey(PublicKey);

impl EncryptionKey {
    /// Parses an encryption key from a 32-byte x-only or 33-byte compressed encoding.
    ///
    /// A compressed point with odd y is replaced by its negation.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AdaptorError> {
        match bytes.len() {
            32 => XOnlyPublicKey::from_slice(bytes)
                .map(Self::from)
                .map_err(AdaptorError::InvalidEncryptionKey),
            _ => PublicKey::from_slice(bytes)
                .map(Self::from)
                .map_err(AdaptorError::InvalidEncryptionKey),
        }
    }

    pub fn as_public_key(&self) -> &PublicKey {
        &self.0
    }

    pub fn to_x_only(&self) -> XOnlyPublicKey {
        self.0.x_only_public_key().0
    }
}

impl From<XOnlyPublicKey> for EncryptionKey {
    fn from(value: XOnlyPublicKey) -> Self {
        Self(PublicKey::from_x_only_public_key(value, Parity::Even))
    }
}

impl From<PublicKey> for EncryptionKey {
    fn from(value: PublicKey) -> Self {
        Self::from(value.x_only_public_key().0)
    }
}

/// Secret scalar that turns an adaptor signature into a usable signature.
///
/// Normalized to even parity so that it always matches the encryption key derived from the
/// x-only public key of the same secret.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DecryptionKey(pub(super) SecretKey);

impl DecryptionKey {
    pub fn as_secret_key(&self) -> &SecretKey {
        &self.0
    }

    /// Returns the encryption key `t·G` matching this decryption key.
    pub fn encryption_key(&self) -> EncryptionKey {
        EncryptionKey(PublicKey::from_secret_key(SECP256K1, &self.0))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.secret_bytes()
    }
}

impl From<SecretKey> for DecryptionKey {
    fn from(value: SecretKey) -> Self {
        Self(EvenSecretKey::from(value).into())
    }
}

impl From<EvenSecretKey> for DecryptionKey {
    fn from(value: EvenSecretKey) -> Self {
        Self(value.into())
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DecryptionKey(..)")
    }
}
