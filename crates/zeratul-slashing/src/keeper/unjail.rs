use super::Keeper;
use crate::error::{Result, SlashingError};
use tracing::info;
use zeratul_staking::{Address, Codec, Context, ValidatorSet};

impl<C: Codec> Keeper<C> {
    /// Release a jailed validator once its jail time is over
    pub fn unjail(&self, ctx: &mut Context<'_>, sk: &dyn ValidatorSet, operator: &Address) -> Result<()> {
        let validator = sk
            .validator(ctx, operator)
            .ok_or(SlashingError::NoValidatorForAddress(*operator))?;

        let self_delegation = sk
            .delegation(ctx, operator, operator)
            .ok_or(SlashingError::MissingSelfDelegation)?;
        let self_bond = validator
            .tokens_from_shares(&self_delegation.shares)
            .truncate_int();
        if self_bond < validator.min_self_delegation {
            return Err(SlashingError::SelfDelegationTooLowToUnjail);
        }

        if !validator.jailed {
            return Err(SlashingError::ValidatorNotJailed);
        }

        let cons_addr = validator.cons_address();
        let signing_info = self
            .get_validator_signing_info(ctx, &cons_addr)
            .ok_or(SlashingError::NoSigningInfoFound(cons_addr))?;
        if signing_info.tombstoned {
            return Err(SlashingError::Tombstoned);
        }
        if ctx.block_time() < signing_info.jailed_until {
            return Err(SlashingError::ValidatorJailed);
        }

        sk.unjail(ctx, &cons_addr);
        info!(validator = %operator, "validator unjail requested");
        Ok(())
    }
}
