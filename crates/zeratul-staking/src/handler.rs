//! Message handler
//!
//! Each message runs inside its own cache branch of the context: a
//! rejected message leaves no writes behind, whatever step it failed at.

use crate::codec::Codec;
use crate::context::Context;
use crate::error::{Result, StakingError};
use crate::keeper::{Keeper, TokenSource};
use crate::msg::{
    MsgBeginRedelegate, MsgCreateValidator, MsgDelegate, MsgEditValidator, MsgUndelegate, StakingMsg,
};
use crate::types::{Coin, Timestamp};
use crate::validator::{Commission, Validator};
use tracing::info;

/// Outcome of a successfully handled message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MsgResponse {
    Empty,
    /// When the unbonding or redelegation completes
    CompletionTime(Timestamp),
}

pub fn handle_msg<C: Codec>(ctx: &mut Context<'_>, keeper: &Keeper<C>, msg: &StakingMsg) -> Result<MsgResponse> {
    msg.validate_basic()?;
    ctx.branch(|ctx| match msg {
        StakingMsg::CreateValidator(msg) => handle_create_validator(ctx, keeper, msg),
        StakingMsg::EditValidator(msg) => handle_edit_validator(ctx, keeper, msg),
        StakingMsg::Delegate(msg) => handle_delegate(ctx, keeper, msg),
        StakingMsg::Undelegate(msg) => handle_undelegate(ctx, keeper, msg),
        StakingMsg::BeginRedelegate(msg) => handle_begin_redelegate(ctx, keeper, msg),
    })
}

fn check_denom<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>, coin: &Coin) -> Result<()> {
    let expected = keeper.bond_denom(ctx);
    if coin.denom != expected {
        return Err(StakingError::BadDenom {
            got: coin.denom.clone(),
            expected,
        });
    }
    Ok(())
}

fn handle_create_validator<C: Codec>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C>,
    msg: &MsgCreateValidator,
) -> Result<MsgResponse> {
    if keeper.get_validator(ctx, &msg.validator_address).is_some() {
        return Err(StakingError::ValidatorOwnerExists);
    }
    if keeper.get_validator_by_cons_addr(ctx, &msg.pubkey.address()).is_some() {
        return Err(StakingError::ValidatorPubKeyExists);
    }
    check_denom(ctx, keeper, &msg.value)?;
    msg.description.ensure_length()?;
    if let Some(params) = ctx.consensus_params() {
        let key_type = msg.pubkey.key_type();
        if !params.pub_key_types.contains(&key_type) {
            return Err(StakingError::ValidatorPubKeyTypeNotSupported(key_type));
        }
    }

    let mut validator = Validator::new(msg.validator_address, msg.pubkey.clone(), msg.description.clone());
    validator.set_initial_commission(Commission::new(msg.commission.clone(), ctx.block_time()))?;
    validator.min_self_delegation = msg.min_self_delegation;
    validator.rank_sequence = keeper.next_rank_sequence(ctx);

    keeper.set_validator(ctx, &validator);
    keeper.set_validator_by_cons_addr(ctx, &validator);
    keeper.set_new_validator_by_power_index(ctx, &validator);
    if let Some(hooks) = keeper.hooks() {
        hooks.after_validator_created(ctx, &validator);
    }

    keeper.delegate(ctx, &msg.delegator_address, msg.value.amount, TokenSource::Account, validator)?;

    info!(
        validator = %msg.validator_address,
        self_delegation = msg.value.amount,
        "created validator"
    );
    Ok(MsgResponse::Empty)
}

fn handle_edit_validator<C: Codec>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C>,
    msg: &MsgEditValidator,
) -> Result<MsgResponse> {
    let mut validator = keeper.ensure_validator(ctx, &msg.validator_address)?;

    validator.description = validator.description.update(&msg.description)?;

    if let Some(rate) = &msg.commission_rate {
        let commission = keeper.update_validator_commission(ctx, &validator, rate)?;
        if let Some(hooks) = keeper.hooks() {
            hooks.before_validator_modified(ctx, &msg.validator_address);
        }
        validator.commission = commission;
    }

    if let Some(min_self_delegation) = msg.min_self_delegation {
        if min_self_delegation <= validator.min_self_delegation {
            return Err(StakingError::MinSelfDelegationDecreased);
        }
        if min_self_delegation > validator.tokens {
            return Err(StakingError::SelfDelegationBelowMinimum);
        }
        validator.min_self_delegation = min_self_delegation;
    }

    keeper.set_validator(ctx, &validator);
    Ok(MsgResponse::Empty)
}

fn handle_delegate<C: Codec>(ctx: &mut Context<'_>, keeper: &Keeper<C>, msg: &MsgDelegate) -> Result<MsgResponse> {
    let validator = keeper.ensure_validator(ctx, &msg.validator_address)?;
    check_denom(ctx, keeper, &msg.amount)?;
    keeper.delegate(ctx, &msg.delegator_address, msg.amount.amount, TokenSource::Account, validator)?;
    Ok(MsgResponse::Empty)
}

fn handle_undelegate<C: Codec>(ctx: &mut Context<'_>, keeper: &Keeper<C>, msg: &MsgUndelegate) -> Result<MsgResponse> {
    let shares = keeper.validate_unbond_amount(ctx, &msg.delegator_address, &msg.validator_address, msg.amount.amount)?;
    check_denom(ctx, keeper, &msg.amount)?;
    let completion = keeper.undelegate(ctx, &msg.delegator_address, &msg.validator_address, &shares)?;
    Ok(MsgResponse::CompletionTime(completion))
}

fn handle_begin_redelegate<C: Codec>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C>,
    msg: &MsgBeginRedelegate,
) -> Result<MsgResponse> {
    let shares = keeper.validate_unbond_amount(
        ctx,
        &msg.delegator_address,
        &msg.validator_src_address,
        msg.amount.amount,
    )?;
    check_denom(ctx, keeper, &msg.amount)?;
    let completion = keeper.begin_redelegation(
        ctx,
        &msg.delegator_address,
        &msg.validator_src_address,
        &msg.validator_dst_address,
        &shares,
    )?;
    Ok(MsgResponse::CompletionTime(completion))
}
