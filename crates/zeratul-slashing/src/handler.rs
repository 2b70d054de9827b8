//! Slashing transactions

use crate::error::{Result, SlashingError};
use crate::keeper::Keeper;
use serde::{Deserialize, Serialize};
use zeratul_staking::{Address, Codec, Context, ValidatorSet};

/// Ask for a jailed validator to rejoin the candidate set
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUnjail {
    pub validator_address: Address,
}

impl MsgUnjail {
    pub fn validate_basic(&self) -> Result<()> {
        if self.validator_address.is_empty() {
            return Err(SlashingError::BadValidatorAddr);
        }
        Ok(())
    }
}

/// Apply an unjail message. Nothing is written unless it succeeds.
pub fn handle_unjail<C: Codec>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C>,
    sk: &dyn ValidatorSet,
    msg: &MsgUnjail,
) -> Result<()> {
    msg.validate_basic()?;
    ctx.branch(|ctx| keeper.unjail(ctx, sk, &msg.validator_address))
}
