use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use strata_crypto::{CompressedPublicKey, EvenPublicKey};
use strata_params::{Rate, StakingParams};

use crate::{errors::ValidatorError, pop::ProofOfPossession};

const MAX_MONIKER_LEN: usize = 70;
const MAX_IDENTITY_LEN: usize = 3_000;
const MAX_WEBSITE_LEN: usize = 140;
const MAX_DETAILS_LEN: usize = 280;

/// Human readable metadata of a validator.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ValidatorDescription {
    pub moniker: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub details: String,
}

impl ValidatorDescription {
    pub fn validate(&self) -> Result<(), ValidatorError> {
        if self.moniker.trim().is_empty() {
            return Err(ValidatorError::EmptyMoniker);
        }

        for (field, value, max) in [
            ("moniker", &self.moniker, MAX_MONIKER_LEN),
            ("identity", &self.identity, MAX_IDENTITY_LEN),
            ("website", &self.website, MAX_WEBSITE_LEN),
            ("details", &self.details, MAX_DETAILS_LEN),
        ] {
            if value.len() > max {
                return Err(ValidatorError::DescriptionTooLong {
                    field,
                    len: value.len(),
                    max,
                });
            }
        }

        Ok(())
    }
}

/// A registered validator, keyed by its BTC public key.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Validator {
    btc_pk: EvenPublicKey,
    account_pk: CompressedPublicKey,
    description: ValidatorDescription,
    commission: Rate,
    pop: ProofOfPossession,
}

impl Validator {
    pub fn new(
        btc_pk: EvenPublicKey,
        account_pk: CompressedPublicKey,
        description: ValidatorDescription,
        commission: Rate,
        pop: ProofOfPossession,
    ) -> Self {
        Self {
            btc_pk,
            account_pk,
            description,
            commission,
            pop,
        }
    }

    /// Checks everything about the registration that does not depend on existing records.
    pub fn validate(&self, params: &StakingParams) -> Result<(), ValidatorError> {
        self.description.validate()?;

        if self.commission < params.min_commission_rate {
            return Err(ValidatorError::CommissionTooLow {
                min: params.min_commission_rate,
                got: self.commission,
            });
        }

        self.pop.verify(self.account_pk.as_inner(), &self.btc_pk.x_only())?;
        Ok(())
    }

    pub fn btc_pk(&self) -> &EvenPublicKey {
        &self.btc_pk
    }

    pub fn account_pk(&self) -> &CompressedPublicKey {
        &self.account_pk
    }

    pub fn description(&self) -> &ValidatorDescription {
        &self.description
    }

    pub fn commission(&self) -> Rate {
        self.commission
    }

    pub fn pop(&self) -> &ProofOfPossession {
        &self.pop
    }
}
