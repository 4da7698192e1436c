//! Key types used by the staking scripts and signature schemes.
//!
//! - [`compressed`] - Compressed ECDSA public keys with serialization support
//! - [`even`] - Even parity keys for BIP340 Schnorr signatures and taproot

pub mod compressed;
pub mod even;
