//! error types for staking

use crate::bank::BankError;
use crate::types::{Address, PubKeyType};
use thiserror::Error;

/// Validation failures. Returned to the caller; the message that caused
/// them leaves no trace in state.
#[derive(Debug, Error)]
pub enum StakingError {
    #[error("validator does not exist for address {0}")]
    NoValidatorFound(Address),

    #[error("validator already exist for this operator address, must use new validator operator address")]
    ValidatorOwnerExists,

    #[error("validator already exist for this pubkey, must use new validator pubkey")]
    ValidatorPubKeyExists,

    #[error("validator pubkey type {0} is not supported")]
    ValidatorPubKeyTypeNotSupported(PubKeyType),

    #[error("validator for this address is currently jailed")]
    ValidatorJailed,

    #[error("invalid commission: {0}")]
    InvalidCommission(&'static str),

    #[error("commission cannot be changed more than once in 24h")]
    CommissionUpdateTooSoon,

    #[error("commission cannot be changed more than max change rate")]
    CommissionGtMaxChangeRate,

    #[error("commission cannot be more than the max rate")]
    CommissionGtMaxRate,

    #[error("commission must be positive")]
    CommissionNegative,

    #[error("validator's self delegation must be greater than their minimum self delegation")]
    SelfDelegationBelowMinimum,

    #[error("minimum self delegation must be a positive integer")]
    MinSelfDelegationInvalid,

    #[error("minimum self delegation cannot be decrease")]
    MinSelfDelegationDecreased,

    #[error("invalid coin denomination: got {got}, expected {expected}")]
    BadDenom { got: String, expected: String },

    #[error("amount must be positive")]
    BadDelegationAmount,

    #[error("no delegation for (address, validator) tuple")]
    NoDelegation,

    #[error("not enough delegation shares")]
    NotEnoughDelegationShares,

    #[error("invalid shares amount")]
    BadSharesAmount,

    #[error("no unbonding delegation found")]
    NoUnbondingDelegation,

    #[error("too many unbonding delegation entries for (delegator, validator) tuple")]
    MaxUnbondingDelegationEntries,

    #[error("no redelegation found")]
    NoRedelegation,

    #[error("cannot redelegate to the same validator")]
    SelfRedelegation,

    #[error("too few tokens to redelegate (truncates to zero tokens)")]
    TinyRedelegationAmount,

    #[error("redelegation destination validator not found")]
    BadRedelegationDst,

    #[error("redelegation to this validator already in progress; first redelegation to this validator must complete before next redelegation")]
    TransitiveRedelegation,

    #[error("too many redelegation entries for (delegator, src-validator, dst-validator) tuple")]
    MaxRedelegationEntries,

    #[error("cannot delegate to validators with invalid (zero) ex-rate")]
    DelegatorShareExRateInvalid,

    #[error("{field} is longer than max length of {max}")]
    DescriptionTooLong { field: &'static str, max: usize },

    #[error("empty description")]
    EmptyDescription,

    #[error("empty validator address")]
    EmptyValidatorAddr,

    #[error("validator address is invalid")]
    BadValidatorAddr,

    #[error("transaction must include some information to modify")]
    NothingToModify,

    #[error("empty delegator address")]
    EmptyDelegatorAddr,

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("bank error: {0}")]
    Bank(#[from] BankError),
}

pub type Result<T> = std::result::Result<T, StakingError>;
