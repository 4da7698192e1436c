use std::fmt;

use bitcoin::Amount;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::ParamsError;

/// Basis points in a whole.
pub const BPS_DENOMINATOR: u16 = 10_000;

/// A fraction in `[0, 1]`, expressed in basis points.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct Rate(u16);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const ONE: Rate = Rate(BPS_DENOMINATOR);

    pub fn from_bps(bps: u16) -> Result<Self, ParamsError> {
        if bps > BPS_DENOMINATOR {
            return Err(ParamsError::InvalidRate(bps));
        }
        Ok(Self(bps))
    }

    pub fn bps(&self) -> u16 {
        self.0
    }

    /// True if strictly between 0 and 1.
    pub fn is_proper_fraction(&self) -> bool {
        self.0 > 0 && self.0 < BPS_DENOMINATOR
    }

    /// Returns `floor(amount * rate)`.
    pub fn apply(&self, amount: Amount) -> Amount {
        let scaled = u128::from(amount.to_sat()) * u128::from(self.0) / u128::from(BPS_DENOMINATOR);
        // Never exceeds `amount`, which already fits in a u64.
        Amount::from_sat(scaled as u64)
    }
}

impl TryFrom<u16> for Rate {
    type Error = ParamsError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_bps(value)
    }
}

impl From<Rate> for u16 {
    fn from(value: Rate) -> Self {
        value.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}
