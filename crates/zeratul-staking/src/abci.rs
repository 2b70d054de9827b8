//! Block lifecycle entry points

use crate::codec::Codec;
use crate::context::Context;
use crate::error::StakingError;
use crate::keeper::Keeper;
use crate::validator::ValidatorUpdate;
use tracing::debug;

/// Record historical info for the block being started
pub fn begin_blocker<C: Codec>(ctx: &mut Context<'_>, keeper: &Keeper<C>) {
    keeper.track_historical_info(ctx);
}

/// Apply the validator set diff, then sweep the three maturity queues in
/// order: validators, unbonding delegations, redelegations.
pub fn end_blocker<C: Codec>(ctx: &mut Context<'_>, keeper: &Keeper<C>) -> Vec<ValidatorUpdate> {
    let updates = keeper.apply_and_return_validator_set_updates(ctx);

    keeper.unbond_all_mature_validator_queue(ctx);

    let now = ctx.block_time();
    for pair in keeper.dequeue_all_mature_ubd_queue(ctx, now) {
        match ctx.branch(|ctx| keeper.complete_unbonding(ctx, &pair.delegator, &pair.validator)) {
            Ok(_) => {}
            // duplicates in a bucket find the record already completed
            Err(StakingError::NoUnbondingDelegation) => {
                debug!(delegator = %pair.delegator, validator = %pair.validator, "unbonding already completed");
            }
            Err(e) => panic!(
                "completing unbonding of {} from {} failed: {}",
                pair.delegator, pair.validator, e
            ),
        }
    }

    for triplet in keeper.dequeue_all_mature_redelegation_queue(ctx, now) {
        match ctx.branch(|ctx| keeper.complete_redelegation(ctx, &triplet.delegator, &triplet.src, &triplet.dst)) {
            Ok(_) => {}
            Err(StakingError::NoRedelegation) => {
                debug!(delegator = %triplet.delegator, src = %triplet.src, dst = %triplet.dst, "redelegation already completed");
            }
            Err(e) => panic!(
                "completing redelegation of {} from {} to {} failed: {}",
                triplet.delegator, triplet.src, triplet.dst, e
            ),
        }
    }

    updates
}
