//! Slashing module parameters

use crate::error::{Result, SlashingError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use zeratul_staking::Dec;

pub const DEFAULT_SIGNED_BLOCKS_WINDOW: i64 = 100;

/// Three weeks, matching the staking unbonding period
pub const DEFAULT_MAX_EVIDENCE_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 7 * 3);

pub const DEFAULT_DOWNTIME_JAIL_DURATION: Duration = Duration::from_secs(60 * 10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Number of most recent blocks the liveness check looks at
    pub signed_blocks_window: i64,

    /// Share of the window a validator has to sign
    pub min_signed_per_window: Dec,

    /// How long a validator jailed for downtime stays jailed
    pub downtime_jail_duration: Duration,

    pub slash_fraction_double_sign: Dec,

    pub slash_fraction_downtime: Dec,

    /// Evidence older than this is ignored
    pub max_evidence_age: Duration,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            signed_blocks_window: DEFAULT_SIGNED_BLOCKS_WINDOW,
            min_signed_per_window: Dec::new_with_prec(5, 1),
            downtime_jail_duration: DEFAULT_DOWNTIME_JAIL_DURATION,
            slash_fraction_double_sign: Dec::one().quo_int(20),
            slash_fraction_downtime: Dec::one().quo_int(100),
            max_evidence_age: DEFAULT_MAX_EVIDENCE_AGE,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<()> {
        if self.signed_blocks_window <= 0 {
            return Err(SlashingError::InvalidParams(format!(
                "signed blocks window must be positive: {}",
                self.signed_blocks_window
            )));
        }
        validate_fraction("min signed per window", &self.min_signed_per_window)?;
        validate_fraction("double sign slash fraction", &self.slash_fraction_double_sign)?;
        validate_fraction("downtime slash fraction", &self.slash_fraction_downtime)?;
        if self.downtime_jail_duration.is_zero() {
            return Err(SlashingError::InvalidParams(
                "downtime jail duration must be positive".into(),
            ));
        }
        if self.max_evidence_age.is_zero() {
            return Err(SlashingError::InvalidParams(
                "max evidence age must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Blocks out of each window a validator has to sign, rounded
    pub fn min_signed_blocks(&self) -> i64 {
        Dec::from_i64(self.signed_blocks_window)
            .mul(&self.min_signed_per_window)
            .round_int64()
    }

    /// Missed blocks tolerated within one window
    pub fn max_missed_blocks(&self) -> i64 {
        self.signed_blocks_window - self.min_signed_blocks()
    }
}

fn validate_fraction(name: &str, value: &Dec) -> Result<()> {
    if value.is_negative() || *value > Dec::one() {
        return Err(SlashingError::InvalidParams(format!(
            "{} must be within [0, 1]: {}",
            name, value
        )));
    }
    Ok(())
}
