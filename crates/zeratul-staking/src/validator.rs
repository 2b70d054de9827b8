//! Validator records and exchange-rate arithmetic
//!
//! A validator's `tokens` back its `delegator_shares`; a share is worth
//! `tokens / delegator_shares`. Delegating and undelegating move both sides
//! at the current rate, slashing removes tokens only, so the rate can only
//! fall.

use crate::error::{Result, StakingError};
use crate::math::{tokens_to_consensus_power, Dec};
use crate::types::{Address, ConsAddress, ConsPubKey, Height, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const MAX_MONIKER_LENGTH: usize = 70;
pub const MAX_IDENTITY_LENGTH: usize = 3000;
pub const MAX_WEBSITE_LENGTH: usize = 140;
pub const MAX_SECURITY_CONTACT_LENGTH: usize = 140;
pub const MAX_DETAILS_LENGTH: usize = 280;

/// Minimum time between two commission rate changes
pub const COMMISSION_UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondStatus {
    Unbonded,
    Unbonding,
    Bonded,
}

impl fmt::Display for BondStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BondStatus::Unbonded => "Unbonded",
            BondStatus::Unbonding => "Unbonding",
            BondStatus::Bonded => "Bonded",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Description
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

impl Description {
    /// Placeholder meaning "keep the current value" in an edit
    pub const DO_NOT_MODIFY: &'static str = "[do-not-modify]";

    pub fn new(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            ..Self::default()
        }
    }

    /// Every field left empty or `[do-not-modify]`
    pub fn is_unset(&self) -> bool {
        [
            &self.moniker,
            &self.identity,
            &self.website,
            &self.security_contact,
            &self.details,
        ]
        .iter()
        .all(|f| f.is_empty() || f.as_str() == Self::DO_NOT_MODIFY)
    }

    /// Apply an edit; `[do-not-modify]` fields keep their current value
    pub fn update(&self, edit: &Description) -> Result<Description> {
        let pick = |new: &String, old: &String| {
            if new == Self::DO_NOT_MODIFY {
                old.clone()
            } else {
                new.clone()
            }
        };
        let updated = Description {
            moniker: pick(&edit.moniker, &self.moniker),
            identity: pick(&edit.identity, &self.identity),
            website: pick(&edit.website, &self.website),
            security_contact: pick(&edit.security_contact, &self.security_contact),
            details: pick(&edit.details, &self.details),
        };
        updated.ensure_length()?;
        Ok(updated)
    }

    pub fn ensure_length(&self) -> Result<()> {
        let checks = [
            ("moniker", &self.moniker, MAX_MONIKER_LENGTH),
            ("identity", &self.identity, MAX_IDENTITY_LENGTH),
            ("website", &self.website, MAX_WEBSITE_LENGTH),
            ("security contact", &self.security_contact, MAX_SECURITY_CONTACT_LENGTH),
            ("details", &self.details, MAX_DETAILS_LENGTH),
        ];
        for (field, value, max) in checks {
            if value.len() > max {
                return Err(StakingError::DescriptionTooLong { field, max });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Commission
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRates {
    /// Current rate charged to delegators
    pub rate: Dec,
    /// Upper bound the rate can never exceed
    pub max_rate: Dec,
    /// Largest change allowed per update
    pub max_change_rate: Dec,
}

impl CommissionRates {
    pub fn new(rate: Dec, max_rate: Dec, max_change_rate: Dec) -> Self {
        Self {
            rate,
            max_rate,
            max_change_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rate.is_negative() {
            return Err(StakingError::CommissionNegative);
        }
        if self.max_rate > Dec::one() {
            return Err(StakingError::InvalidCommission(
                "max rate cannot be greater than 1",
            ));
        }
        if self.rate.is_negative() {
            return Err(StakingError::CommissionNegative);
        }
        if self.rate > self.max_rate {
            return Err(StakingError::CommissionGtMaxRate);
        }
        if self.max_change_rate.is_negative() {
            return Err(StakingError::CommissionNegative);
        }
        if self.max_change_rate > self.max_rate {
            return Err(StakingError::InvalidCommission(
                "max change rate cannot be greater than the max rate",
            ));
        }
        Ok(())
    }
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self::new(Dec::zero(), Dec::zero(), Dec::zero())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub rates: CommissionRates,
    /// Block time of the last rate change
    pub update_time: Timestamp,
}

impl Commission {
    pub fn new(rates: CommissionRates, update_time: Timestamp) -> Self {
        Self { rates, update_time }
    }

    /// Check a rate change requested at `block_time`
    pub fn validate_new_rate(&self, new_rate: &Dec, block_time: Timestamp) -> Result<()> {
        if block_time.saturating_duration_since(self.update_time) < COMMISSION_UPDATE_INTERVAL {
            return Err(StakingError::CommissionUpdateTooSoon);
        }
        if new_rate.is_negative() {
            return Err(StakingError::CommissionNegative);
        }
        if *new_rate > self.rates.max_rate {
            return Err(StakingError::CommissionGtMaxRate);
        }
        if (new_rate - &self.rates.rate).abs() > self.rates.max_change_rate {
            return Err(StakingError::CommissionGtMaxChangeRate);
        }
        Ok(())
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Power change handed to consensus; zero power removes the validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub pub_key: ConsPubKey,
    pub power: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator account
    pub operator: Address,
    pub consensus_pubkey: ConsPubKey,
    /// Jailed validators are absent from the power index
    pub jailed: bool,
    pub status: BondStatus,
    /// Bonded stake, self and delegated
    pub tokens: u128,
    /// Total shares issued to delegators
    pub delegator_shares: Dec,
    pub description: Description,
    /// Height at which the validator started unbonding
    pub unbonding_height: Height,
    /// Time at which unbonding completes
    pub unbonding_completion_time: Timestamp,
    pub commission: Commission,
    /// Self-delegation below this jails the validator
    pub min_self_delegation: u128,
    /// Position among equal-power validators in the power index,
    /// assigned when the validator's power last changed
    pub rank_sequence: u64,
}

impl Validator {
    pub fn new(operator: Address, consensus_pubkey: ConsPubKey, description: Description) -> Self {
        Self {
            operator,
            consensus_pubkey,
            jailed: false,
            status: BondStatus::Unbonded,
            tokens: 0,
            delegator_shares: Dec::zero(),
            description,
            unbonding_height: 0,
            unbonding_completion_time: Timestamp::ZERO,
            commission: Commission::default(),
            min_self_delegation: 1,
            rank_sequence: 0,
        }
    }

    pub fn cons_address(&self) -> ConsAddress {
        self.consensus_pubkey.address()
    }

    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }

    pub fn is_unbonded(&self) -> bool {
        self.status == BondStatus::Unbonded
    }

    pub fn is_unbonding(&self) -> bool {
        self.status == BondStatus::Unbonding
    }

    /// Tokens are gone but shares remain: every share is worth nothing
    pub fn invalid_ex_rate(&self) -> bool {
        self.tokens == 0 && self.delegator_shares.is_positive()
    }

    pub fn tokens_from_shares(&self, shares: &Dec) -> Dec {
        shares.mul_int(self.tokens).quo(&self.delegator_shares)
    }

    pub fn tokens_from_shares_truncated(&self, shares: &Dec) -> Dec {
        shares.mul_int(self.tokens).quo_truncate(&self.delegator_shares)
    }

    pub fn tokens_from_shares_round_up(&self, shares: &Dec) -> Dec {
        shares.mul_int(self.tokens).quo_round_up(&self.delegator_shares)
    }

    /// Shares worth `amount` tokens at the current rate
    pub fn shares_from_tokens(&self, amount: u128) -> Result<Dec> {
        if self.tokens == 0 {
            return Err(StakingError::NotEnoughDelegationShares);
        }
        Ok(self.delegator_shares.mul_int(amount).quo_int(self.tokens))
    }

    pub fn shares_from_tokens_truncated(&self, amount: u128) -> Result<Dec> {
        if self.tokens == 0 {
            return Err(StakingError::NotEnoughDelegationShares);
        }
        Ok(self
            .delegator_shares
            .mul_int(amount)
            .quo_truncate(&Dec::from_int(self.tokens)))
    }

    pub fn bonded_tokens(&self) -> u128 {
        if self.is_bonded() {
            self.tokens
        } else {
            0
        }
    }

    /// Power as seen by consensus: zero unless bonded
    pub fn consensus_power(&self) -> i64 {
        if self.is_bonded() {
            self.potential_consensus_power()
        } else {
            0
        }
    }

    /// Power the validator would have if bonded
    pub fn potential_consensus_power(&self) -> i64 {
        tokens_to_consensus_power(self.tokens)
    }

    pub fn abci_validator_update(&self) -> ValidatorUpdate {
        ValidatorUpdate {
            pub_key: self.consensus_pubkey.clone(),
            power: self.consensus_power(),
        }
    }

    pub fn abci_validator_update_zero(&self) -> ValidatorUpdate {
        ValidatorUpdate {
            pub_key: self.consensus_pubkey.clone(),
            power: 0,
        }
    }

    /// Validate and install the commission a validator is created with
    pub fn set_initial_commission(&mut self, commission: Commission) -> Result<()> {
        commission.rates.validate()?;
        self.commission = commission;
        Ok(())
    }

    /// Add tokens delegated to this validator, returning the shares issued
    ///
    /// The first delegation issues shares one to one.
    pub fn add_tokens_from_del(&mut self, amount: u128) -> Dec {
        let issued = if self.delegator_shares.is_zero() {
            Dec::from_int(amount)
        } else {
            self.shares_from_tokens(amount).unwrap_or_else(|_| {
                panic!(
                    "validator {} has shares but no tokens; delegation must be rejected earlier",
                    self.operator
                )
            })
        };
        self.tokens += amount;
        self.delegator_shares = &self.delegator_shares + &issued;
        issued
    }

    /// Remove tokens without touching shares (slashing)
    pub fn remove_tokens(&mut self, amount: u128) {
        assert!(
            amount <= self.tokens,
            "attempting to remove {} tokens from validator {} holding {}",
            amount,
            self.operator,
            self.tokens
        );
        self.tokens -= amount;
    }

    /// Redeem `shares`, returning the tokens they were worth
    ///
    /// Redeeming the last shares hands out every remaining token so no
    /// unredeemable dust is left behind; otherwise the amount is truncated.
    pub fn remove_del_shares(&mut self, shares: &Dec) -> u128 {
        let remaining = &self.delegator_shares - shares;
        let issued = if remaining.is_zero() {
            let all = self.tokens;
            self.tokens = 0;
            all
        } else {
            let issued = self.tokens_from_shares(shares).truncate_int();
            assert!(
                issued <= self.tokens,
                "attempting to remove more tokens than available in validator {}",
                self.operator
            );
            self.tokens -= issued;
            issued
        };
        self.delegator_shares = remaining;
        issued
    }
}
