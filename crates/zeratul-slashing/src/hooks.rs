//! Staking events the slashing module follows

use crate::keeper::Keeper;
use crate::signing_info::ValidatorSigningInfo;
use tracing::debug;
use zeratul_staking::{Address, BincodeCodec, Codec, ConsAddress, Context, StakingHooks, Validator};

/// `StakingHooks` view of the slashing keeper, see `Keeper::hooks`
#[derive(Clone)]
pub struct Hooks<C: Codec = BincodeCodec> {
    keeper: Keeper<C>,
}

impl<C: Codec + Clone> Keeper<C> {
    pub fn hooks(&self) -> Hooks<C> {
        Hooks {
            keeper: self.clone(),
        }
    }
}

impl<C: Codec> StakingHooks for Hooks<C> {
    fn after_validator_created(&self, ctx: &mut Context<'_>, validator: &Validator) {
        self.keeper.add_pubkey(ctx, &validator.consensus_pubkey);
    }

    /// Start tracking liveness the first time a validator bonds. A
    /// rebonding validator keeps its record.
    fn after_validator_bonded(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress, _operator: &Address) {
        if self.keeper.get_validator_signing_info(ctx, cons_addr).is_some() {
            return;
        }
        let info = ValidatorSigningInfo::new(*cons_addr, ctx.block_height());
        self.keeper.set_validator_signing_info(ctx, &info);
        debug!(validator = %cons_addr, start_height = info.start_height, "created signing info");
    }

    fn after_validator_removed(&self, ctx: &mut Context<'_>, cons_addr: &ConsAddress, _operator: &Address) {
        self.keeper.delete_pubkey(ctx, cons_addr);
    }
}
