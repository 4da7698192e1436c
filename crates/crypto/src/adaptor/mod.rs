//! Schnorr adaptor signatures over secp256k1.
//!
//! A covenant member encrypts its slashing signature under a validator's public key. The
//! result can be publicly verified, but only becomes a usable BIP340 signature once the
//! validator's secret key is known. Conversely, seeing the decrypted signature on chain
//! reveals that secret.

mod errors;
mod keys;
mod signature;

pub use errors::AdaptorError;
pub use keys::{DecryptionKey, EncryptionKey};
pub use signature::{ADAPTOR_SIGNATURE_SIZE, AdaptorSignature};
