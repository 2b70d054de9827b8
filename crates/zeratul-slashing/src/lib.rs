//! Validator liveness and double-sign punishment for zeratul
//!
//! Follows which bonded validators sign each block over a sliding window,
//! jails the ones that miss too much of it, and tombstones the ones caught
//! signing twice. Stake is burned and validators jailed through the
//! `ValidatorSet` that `zeratul-staking` exposes; the keeper's `hooks()`
//! are installed on the staking keeper so validators are tracked from the
//! moment they bond.

pub mod abci;
pub mod error;
pub mod genesis;
pub mod handler;
pub mod hooks;
pub mod keeper;
pub mod keys;
pub mod params;
pub mod signing_info;

pub use abci::{begin_blocker, Evidence, EvidenceKind, VoteInfo};
pub use error::{Result, SlashingError};
pub use genesis::{export_genesis, init_genesis, GenesisState, MissedBlocks};
pub use handler::{handle_unjail, MsgUnjail};
pub use hooks::Hooks;
pub use keeper::Keeper;
pub use params::Params;
pub use signing_info::{ValidatorSigningInfo, DOUBLE_SIGN_JAIL_END_TIME};
