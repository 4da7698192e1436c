//! Cryptographic primitives for BTC staking.
//!
//! Besides plain BIP340 and ECDSA helpers this crate carries the adaptor signature scheme that
//! ties a covenant member's slashing authorization to a validator's secret key.

pub mod adaptor;
pub mod ecdsa;
pub mod keys;
pub mod schnorr;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use adaptor::{AdaptorError, AdaptorSignature, DecryptionKey, EncryptionKey};
pub use ecdsa::EcdsaSig;
pub use keys::{
    compressed::CompressedPublicKey,
    even::{EvenPublicKey, EvenSecretKey, even_kp},
};
pub use schnorr::SchnorrSig;
