//! Seeded key material.

use rand_chacha::{ChaCha20Rng, rand_core::SeedableRng};
use strata_crypto::{EvenPublicKey, EvenSecretKey, test_utils::gen_even_keypair};

/// A reproducible RNG for `seed`.
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// `n` even-parity key pairs drawn from the RNG seeded with `seed`.
pub fn keypairs(seed: u64, n: usize) -> Vec<(EvenSecretKey, EvenPublicKey)> {
    let mut rng = seeded_rng(seed);
    (0..n).map(|_| gen_even_keypair(&mut rng)).collect()
}

pub fn keypair(seed: u64) -> (EvenSecretKey, EvenPublicKey) {
    gen_even_keypair(&mut seeded_rng(seed))
}

/// Key roles of one delegation.
#[derive(Debug, Clone)]
pub struct StakingKeys {
    pub staker: (EvenSecretKey, EvenPublicKey),
    pub validators: Vec<(EvenSecretKey, EvenPublicKey)>,
    pub covenants: Vec<(EvenSecretKey, EvenPublicKey)>,
}

impl StakingKeys {
    /// Draws all keys of a delegation from one seed.
    pub fn generate(seed: u64, validators: usize, covenants: usize) -> Self {
        let mut keys = keypairs(seed, 1 + validators + covenants).into_iter();
        let staker = keys.next().expect("drew at least one key");
        let validators = keys.by_ref().take(validators).collect();
        let covenants = keys.collect();
        Self {
            staker,
            validators,
            covenants,
        }
    }

    pub fn validator_pks(&self) -> Vec<EvenPublicKey> {
        self.validators.iter().map(|(_, pk)| *pk).collect()
    }

    pub fn covenant_pks(&self) -> Vec<EvenPublicKey> {
        self.covenants.iter().map(|(_, pk)| *pk).collect()
    }
}
