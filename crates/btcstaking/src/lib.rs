//! Bitcoin side of BTC staking: the staking script family, slashing transaction rules,
//! tapscript sighashes, witness assembly and inclusion proofs.

pub mod errors;
pub mod scripts;
pub mod sighash;
pub mod slashing;
pub mod spv;
pub mod staking_info;
pub mod tx;
pub mod witness;

pub use errors::{
    InclusionError, KeyRole, KeySetFault, SlashingTxFault, StakingScriptError, StakingTxError,
};
pub use scripts::{ScriptKeys, UNSPENDABLE_INTERNAL_KEY};
pub use spv::InclusionProof;
pub use staking_info::{SpendPath, StakingInfo};
pub use tx::RawBitcoinTx;
