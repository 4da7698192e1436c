//! Process-wide facilities shared by staking services.

pub mod logging;
