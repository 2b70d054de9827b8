//! Staking module parameters

use crate::error::{Result, StakingError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Three weeks
pub const DEFAULT_UNBONDING_TIME: Duration = Duration::from_secs(60 * 60 * 24 * 7 * 3);

pub const DEFAULT_MAX_VALIDATORS: u32 = 100;

pub const DEFAULT_MAX_ENTRIES: u32 = 7;

pub const DEFAULT_BOND_DENOM: &str = "stake";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// How long stake stays slashable after leaving the bonded set
    pub unbonding_time: Duration,

    /// Size of the bonded validator set
    pub max_validators: u32,

    /// Max unbonding or redelegation entries per (delegator, validator) pair
    pub max_entries: u32,

    /// Number of historical info snapshots to keep (0 disables tracking)
    pub historical_entries: u32,

    /// The only denomination that can be bonded
    pub bond_denom: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            unbonding_time: DEFAULT_UNBONDING_TIME,
            max_validators: DEFAULT_MAX_VALIDATORS,
            max_entries: DEFAULT_MAX_ENTRIES,
            historical_entries: 0,
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<()> {
        if self.unbonding_time.is_zero() {
            return Err(StakingError::InvalidParams(
                "unbonding time must be positive".into(),
            ));
        }
        if self.max_validators == 0 {
            return Err(StakingError::InvalidParams(
                "max validators must be positive".into(),
            ));
        }
        if self.max_entries == 0 {
            return Err(StakingError::InvalidParams(
                "max entries must be positive".into(),
            ));
        }
        validate_denom(&self.bond_denom)
    }
}

/// Denominations start with a letter and are 3-128 characters of
/// `[a-zA-Z0-9/]`
pub fn validate_denom(denom: &str) -> Result<()> {
    let mut chars = denom.chars();
    let starts_with_letter = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '/');
    if !starts_with_letter || !valid_rest || !(3..=128).contains(&denom.len()) {
        return Err(StakingError::InvalidParams(format!(
            "invalid bond denom {:?}",
            denom
        )));
    }
    Ok(())
}
