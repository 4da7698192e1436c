//! Per-path bookkeeping of covenant committee signatures.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use strata_crypto::EvenPublicKey;
use strata_params::StakingParams;

use crate::errors::CovenantSigError;

/// Signatures submitted by covenant members for one spend path of one record.
///
/// Entries are append-only: a member signs a path at most once and a stored signature is never
/// replaced, so the resulting set does not depend on the order submissions arrive in. Keys are
/// ordered by x-only bytes, the same order the multisig script consumes them in.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: Deserialize<'de>"
))]
pub struct CovenantSigSet<S> {
    sigs: BTreeMap<EvenPublicKey, S>,
}

impl<S> Default for CovenantSigSet<S> {
    fn default() -> Self {
        Self {
            sigs: BTreeMap::new(),
        }
    }
}

impl<S> CovenantSigSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether `pk` may submit to this set, without storing anything.
    pub fn check_submission(
        &self,
        params: &StakingParams,
        pk: &EvenPublicKey,
    ) -> Result<(), CovenantSigError> {
        if !params.is_covenant_member(&pk.x_only()) {
            return Err(CovenantSigError::NotCovenantMember(pk.x_only()));
        }
        if self.sigs.contains_key(pk) {
            return Err(CovenantSigError::DuplicateSignature(pk.x_only()));
        }
        Ok(())
    }

    /// Stores the signature of covenant member `pk`.
    ///
    /// Membership is checked against `params`, which must be the version pinned by the owning
    /// record.
    pub fn submit(
        &mut self,
        params: &StakingParams,
        pk: EvenPublicKey,
        sig: S,
    ) -> Result<(), CovenantSigError> {
        self.check_submission(params, &pk)?;
        self.sigs.insert(pk, sig);
        Ok(())
    }

    /// Number of distinct members that signed.
    pub fn count(&self) -> usize {
        self.sigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sigs.is_empty()
    }

    pub fn has_quorum(&self, params: &StakingParams) -> bool {
        self.count() >= params.covenant_quorum as usize
    }

    pub fn get(&self, pk: &EvenPublicKey) -> Option<&S> {
        self.sigs.get(pk)
    }

    pub fn contains(&self, pk: &EvenPublicKey) -> bool {
        self.sigs.contains_key(pk)
    }

    /// All submissions, ascending by covenant key.
    pub fn iter(&self) -> impl Iterator<Item = (&EvenPublicKey, &S)> {
        self.sigs.iter()
    }

    /// The first quorum-many submissions in ascending key order.
    pub fn select_quorum_subset(
        &self,
        params: &StakingParams,
    ) -> Result<Vec<(&EvenPublicKey, &S)>, CovenantSigError> {
        let need = params.covenant_quorum as usize;
        if self.count() < need {
            return Err(CovenantSigError::QuorumNotReached {
                have: self.count(),
                need,
            });
        }
        Ok(self.sigs.iter().take(need).collect())
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{Amount, ScriptBuf};
    use proptest::prelude::*;
    use secp256k1::{PublicKey, SECP256K1, SecretKey};
    use strata_params::Rate;

    use super::*;

    fn pk(byte: u8) -> EvenPublicKey {
        let sk = SecretKey::from_slice(&[byte; 32]).unwrap();
        PublicKey::from_secret_key(SECP256K1, &sk).into()
    }

    fn params(members: &[u8], quorum: u32) -> StakingParams {
        StakingParams {
            covenant_pks: members.iter().map(|b| pk(*b)).collect(),
            covenant_quorum: quorum,
            slashing_pk_script: ScriptBuf::from_bytes(vec![0x51]),
            slashing_rate: Rate::from_bps(1_000).unwrap(),
            min_slashing_tx_fee: Amount::from_sat(1_000),
            min_commission_rate: Rate::ZERO,
            max_active_validators: 100,
            max_unbonding_fee: Amount::from_sat(10_000),
        }
    }

    #[test]
    fn test_non_member_rejected_without_effect() {
        let params = params(&[1, 2, 3], 2);
        let mut set = CovenantSigSet::new();
        set.submit(&params, pk(1), 10u8).unwrap();

        let outsider = pk(9);
        assert_eq!(
            set.submit(&params, outsider, 11),
            Err(CovenantSigError::NotCovenantMember(outsider.x_only()))
        );
        assert_eq!(set.count(), 1);
        assert!(!set.has_quorum(&params));
    }

    #[test]
    fn test_duplicate_rejected_and_original_kept() {
        let params = params(&[1, 2, 3], 2);
        let mut set = CovenantSigSet::new();
        set.submit(&params, pk(2), 20u8).unwrap();
        assert_eq!(
            set.submit(&params, pk(2), 21),
            Err(CovenantSigError::DuplicateSignature(pk(2).x_only()))
        );
        assert_eq!(set.get(&pk(2)), Some(&20));
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn test_select_quorum_subset_is_ascending() {
        let members = [1, 2, 3, 4, 5];
        let params = params(&members, 3);
        let mut set = CovenantSigSet::new();

        assert_eq!(
            set.select_quorum_subset(&params),
            Err(CovenantSigError::QuorumNotReached { have: 0, need: 3 })
        );

        for b in members.iter().rev() {
            set.submit(&params, pk(*b), *b).unwrap();
        }

        let subset = set.select_quorum_subset(&params).unwrap();
        assert_eq!(subset.len(), 3);
        assert!(subset.windows(2).all(|w| w[0].0 < w[1].0));

        let mut expected: Vec<_> = members.iter().map(|b| pk(*b)).collect();
        expected.sort();
        let selected: Vec<_> = subset.iter().map(|(k, _)| **k).collect();
        assert_eq!(selected, expected[..3]);
    }

    proptest! {
        #[test]
        fn proptest_quorum_is_monotonic_and_order_independent(
            order in Just((1u8..=7).collect::<Vec<_>>()).prop_shuffle(),
            repeats in proptest::collection::vec(0usize..7, 0..10),
            quorum in 1u32..=7,
        ) {
            let params = params(&[1, 2, 3, 4, 5, 6, 7], quorum);
            let mut set = CovenantSigSet::new();
            let mut had_quorum = false;

            for (i, b) in order.iter().enumerate() {
                set.submit(&params, pk(*b), *b).unwrap();
                prop_assert_eq!(set.count(), i + 1);

                // Re-submitting an earlier signer never moves the count.
                for r in &repeats {
                    let again = order[*r % (i + 1)];
                    prop_assert!(set.submit(&params, pk(again), 0).is_err());
                    prop_assert_eq!(set.count(), i + 1);
                }

                let has = set.has_quorum(&params);
                prop_assert!(has || !had_quorum);
                prop_assert_eq!(has, i + 1 >= quorum as usize);
                had_quorum = has;
            }

            let mut sorted_set = CovenantSigSet::new();
            for b in 1u8..=7 {
                sorted_set.submit(&params, pk(b), b).unwrap();
            }
            prop_assert_eq!(set, sorted_set);
        }
    }
}
