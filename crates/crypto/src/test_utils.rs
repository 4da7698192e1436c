//! Key generation helpers for tests.

use rand_core::{CryptoRng, RngCore};
use secp256k1::{PublicKey, SECP256K1, SecretKey};

use crate::keys::even::{EvenPublicKey, EvenSecretKey, even_kp};

/// Draws a random secret key from `rng`, retrying on the negligible out-of-range case.
pub fn gen_secret_key<R: RngCore + CryptoRng>(rng: &mut R) -> SecretKey {
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        if let Ok(sk) = SecretKey::from_slice(&bytes) {
            return sk;
        }
    }
}

/// Draws an even-parity key pair from `rng`.
pub fn gen_even_keypair<R: RngCore + CryptoRng>(rng: &mut R) -> (EvenSecretKey, EvenPublicKey) {
    let sk = gen_secret_key(rng);
    let pk = PublicKey::from_secret_key(SECP256K1, &sk);
    even_kp((sk, pk))
}
