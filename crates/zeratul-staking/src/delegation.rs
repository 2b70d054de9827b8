//! Delegations, unbonding delegations and redelegations

use crate::math::Dec;
use crate::types::{Address, Height, Timestamp};
use serde::{Deserialize, Serialize};

/// Shares a delegator holds in one validator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: Address,
    pub validator: Address,
    pub shares: Dec,
}

impl Delegation {
    pub fn new(delegator: Address, validator: Address, shares: Dec) -> Self {
        Self {
            delegator,
            validator,
            shares,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingDelegationEntry {
    /// Height the undelegation happened at
    pub creation_height: Height,
    /// Time the tokens are released
    pub completion_time: Timestamp,
    /// Tokens unbonded, before any slashing
    pub initial_balance: u128,
    /// Tokens still to be released
    pub balance: u128,
}

impl UnbondingDelegationEntry {
    pub fn is_mature(&self, now: Timestamp) -> bool {
        self.completion_time <= now
    }
}

/// Undelegated tokens of one (delegator, validator) pair waiting out the
/// unbonding period
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingDelegation {
    pub delegator: Address,
    pub validator: Address,
    pub entries: Vec<UnbondingDelegationEntry>,
}

impl UnbondingDelegation {
    pub fn new(
        delegator: Address,
        validator: Address,
        creation_height: Height,
        completion_time: Timestamp,
        balance: u128,
    ) -> Self {
        let mut ubd = Self {
            delegator,
            validator,
            entries: Vec::new(),
        };
        ubd.add_entry(creation_height, completion_time, balance);
        ubd
    }

    pub fn add_entry(&mut self, creation_height: Height, completion_time: Timestamp, balance: u128) {
        self.entries.push(UnbondingDelegationEntry {
            creation_height,
            completion_time,
            initial_balance: balance,
            balance,
        });
    }

    pub fn remove_entry(&mut self, index: usize) {
        self.entries.remove(index);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedelegationEntry {
    pub creation_height: Height,
    pub completion_time: Timestamp,
    /// Tokens moved, before any slashing
    pub initial_balance: u128,
    /// Shares created at the destination
    pub shares_dst: Dec,
}

impl RedelegationEntry {
    pub fn is_mature(&self, now: Timestamp) -> bool {
        self.completion_time <= now
    }
}

/// Stake moved from `src` to `dst` that `src` can still be slashed for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redelegation {
    pub delegator: Address,
    pub src: Address,
    pub dst: Address,
    pub entries: Vec<RedelegationEntry>,
}

impl Redelegation {
    pub fn new(
        delegator: Address,
        src: Address,
        dst: Address,
        creation_height: Height,
        completion_time: Timestamp,
        balance: u128,
        shares_dst: Dec,
    ) -> Self {
        let mut red = Self {
            delegator,
            src,
            dst,
            entries: Vec::new(),
        };
        red.add_entry(creation_height, completion_time, balance, shares_dst);
        red
    }

    pub fn add_entry(
        &mut self,
        creation_height: Height,
        completion_time: Timestamp,
        balance: u128,
        shares_dst: Dec,
    ) {
        self.entries.push(RedelegationEntry {
            creation_height,
            completion_time,
            initial_balance: balance,
            shares_dst,
        });
    }

    pub fn remove_entry(&mut self, index: usize) {
        self.entries.remove(index);
    }
}

/// Queue element naming an unbonding delegation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvPair {
    pub delegator: Address,
    pub validator: Address,
}

/// Queue element naming a redelegation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvvTriplet {
    pub delegator: Address,
    pub src: Address,
    pub dst: Address,
}
