//! Ledger-side records of BTC staking: validators, delegations and the covenant signature
//! bookkeeping that moves a delegation through its lifecycle.

mod covenant;
mod delegation;
mod errors;
mod pop;
mod validator;

pub use covenant::CovenantSigSet;
pub use delegation::{Delegation, DelegationInit, DelegationStatus, Undelegation};
pub use errors::{CovenantSigError, PopError, StateTransitionError, ValidatorError};
pub use pop::ProofOfPossession;
pub use validator::{Validator, ValidatorDescription};
