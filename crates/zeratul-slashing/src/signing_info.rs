//! Per-validator liveness record

use serde::{Deserialize, Serialize};
use zeratul_staking::{ConsAddress, Height, Timestamp};

/// `jailed_until` for tombstoned validators: 9999-12-31T23:59:59Z
pub const DOUBLE_SIGN_JAIL_END_TIME: Timestamp = Timestamp::from_secs(253_402_300_799);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSigningInfo {
    pub address: ConsAddress,
    /// Height the validator (re)started being tracked at
    pub start_height: Height,
    /// Blocks seen since the window was last reset; the window position is
    /// this modulo the window size
    pub index_offset: i64,
    /// Earliest time the validator may unjail
    pub jailed_until: Timestamp,
    /// Set after a double sign, permanently
    pub tombstoned: bool,
    /// Missed blocks currently inside the window
    pub missed_blocks_counter: i64,
}

impl ValidatorSigningInfo {
    pub fn new(address: ConsAddress, start_height: Height) -> Self {
        Self {
            address,
            start_height,
            index_offset: 0,
            jailed_until: Timestamp::ZERO,
            tombstoned: false,
            missed_blocks_counter: 0,
        }
    }
}
