//! error types for slashing

use zeratul_staking::{Address, ConsAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlashingError {
    #[error("address {0} is not associated with any known validator")]
    NoValidatorForAddress(Address),

    #[error("missing validator address")]
    BadValidatorAddr,

    #[error("validator has no self-delegation; cannot be unjailed")]
    MissingSelfDelegation,

    #[error("validator's self delegation less than minimum; cannot be unjailed")]
    SelfDelegationTooLowToUnjail,

    #[error("validator not jailed; cannot be unjailed")]
    ValidatorNotJailed,

    #[error("validator still jailed; cannot be unjailed")]
    ValidatorJailed,

    #[error("validator was tombstoned for double signing; cannot be unjailed")]
    Tombstoned,

    #[error("no signing info found for {0}")]
    NoSigningInfoFound(ConsAddress),

    #[error("invalid slashing params: {0}")]
    InvalidParams(String),

    #[error("invalid slashing genesis: {0}")]
    InvalidGenesis(String),
}

pub type Result<T> = std::result::Result<T, SlashingError>;
