//! Validator bonding, delegation and slashing for zeratul
//!
//! Tracks which accounts are validators, how much stake backs each of
//! them, how stake moves between bonded, unbonding and unbonded, and which
//! validator set is handed to consensus at the end of every block.
//!
//! ## Layout
//!
//! - `store` / `context` - ordered KV store, cache branches and the
//!   per-block context every operation runs against
//! - `math` - 18-digit fixed point decimals for shares and fractions
//! - `keeper` - the staking state machine
//! - `handler` / `msg` - transactions, each applied atomically
//! - `abci` - begin and end block entry points
//! - `genesis` / `invariants` - import, export and state audits
//!
//! Misbehaviour tracking lives in `zeratul-slashing`, which drives this
//! crate through the `ValidatorSet` trait and observes it through
//! `StakingHooks`.

pub mod abci;
pub mod bank;
pub mod codec;
pub mod context;
pub mod delegation;
pub mod error;
pub mod genesis;
pub mod handler;
pub mod hooks;
pub mod invariants;
pub mod keeper;
pub mod keys;
pub mod math;
pub mod msg;
pub mod params;
pub mod store;
pub mod types;
pub mod validator;
pub mod validator_set;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bank::{BankError, BankKeeper, BaseBank, BONDED_POOL_NAME, NOT_BONDED_POOL_NAME};
pub use codec::{BincodeCodec, Codec, CodecError};
pub use context::{BlockHeader, ConsensusParams, Context, StoreKey};
pub use delegation::{Delegation, Redelegation, UnbondingDelegation};
pub use error::{Result, StakingError};
pub use genesis::{export_genesis, init_genesis, GenesisState};
pub use handler::{handle_msg, MsgResponse};
pub use hooks::{MultiStakingHooks, StakingHooks};
pub use keeper::{HistoricalInfo, Keeper, TokenSource};
pub use math::{tokens_from_consensus_power, tokens_to_consensus_power, Dec, POWER_REDUCTION};
pub use msg::StakingMsg;
pub use params::Params;
pub use store::{CacheStore, KvStore, MemStore};
pub use types::{Address, Coin, ConsAddress, ConsPubKey, Height, PubKeyType, Timestamp};
pub use validator::{BondStatus, Validator, ValidatorUpdate};
pub use validator_set::ValidatorSet;
