use super::Keeper;
use crate::codec::Codec;
use crate::context::Context;
use crate::delegation::{Delegation, DvPair, DvvTriplet, Redelegation, UnbondingDelegation};
use crate::keys::{
    self, DELEGATION_KEY, REDELEGATION_KEY, REDELEGATION_QUEUE_KEY, UNBONDING_DELEGATION_KEY,
    UNBONDING_QUEUE_KEY,
};
use crate::math::Dec;
use crate::types::{Address, Height, Timestamp, ADDRESS_LEN};

impl<C: Codec> Keeper<C> {
    // ------------------------------------------------------------------
    // delegations
    // ------------------------------------------------------------------

    pub fn get_delegation(&self, ctx: &Context<'_>, delegator: &Address, validator: &Address) -> Option<Delegation> {
        self.get(ctx, &keys::delegation_key(delegator, validator))
    }

    pub fn get_all_delegations(&self, ctx: &Context<'_>) -> Vec<Delegation> {
        ctx.prefix_iter(self.store_key, &[DELEGATION_KEY])
            .into_iter()
            .map(|(_, bytes)| self.codec.must_decode(&bytes))
            .collect()
    }

    /// Delegations made to a validator, in delegator order
    pub fn get_validator_delegations(&self, ctx: &Context<'_>, validator: &Address) -> Vec<Delegation> {
        ctx.prefix_iter(self.store_key, &keys::delegations_by_val_key(validator))
            .into_iter()
            .map(|(key, _)| {
                let delegator = keys::address_at(&key, 1 + ADDRESS_LEN);
                self.get_delegation(ctx, &delegator, validator).unwrap_or_else(|| {
                    panic!("delegation index points at missing delegation {} -> {}", delegator, validator)
                })
            })
            .collect()
    }

    /// Up to `max` delegations of one delegator
    pub fn get_delegator_delegations(&self, ctx: &Context<'_>, delegator: &Address, max: usize) -> Vec<Delegation> {
        ctx.prefix_iter(self.store_key, &keys::delegations_key(delegator))
            .into_iter()
            .take(max)
            .map(|(_, bytes)| self.codec.must_decode(&bytes))
            .collect()
    }

    pub fn set_delegation(&self, ctx: &mut Context<'_>, delegation: &Delegation) {
        self.put(ctx, &keys::delegation_key(&delegation.delegator, &delegation.validator), delegation);
        ctx.set(
            self.store_key,
            &keys::delegation_by_val_index_key(&delegation.validator, &delegation.delegator),
            Vec::new(),
        );
    }

    pub fn remove_delegation(&self, ctx: &mut Context<'_>, delegation: &Delegation) {
        if let Some(hooks) = self.hooks() {
            hooks.before_delegation_removed(ctx, &delegation.delegator, &delegation.validator);
        }
        ctx.delete(self.store_key, &keys::delegation_key(&delegation.delegator, &delegation.validator));
        ctx.delete(
            self.store_key,
            &keys::delegation_by_val_index_key(&delegation.validator, &delegation.delegator),
        );
    }

    // ------------------------------------------------------------------
    // unbonding delegations
    // ------------------------------------------------------------------

    pub fn get_unbonding_delegation(
        &self,
        ctx: &Context<'_>,
        delegator: &Address,
        validator: &Address,
    ) -> Option<UnbondingDelegation> {
        self.get(ctx, &keys::ubd_key(delegator, validator))
    }

    pub fn get_all_unbonding_delegations(&self, ctx: &Context<'_>) -> Vec<UnbondingDelegation> {
        ctx.prefix_iter(self.store_key, &[UNBONDING_DELEGATION_KEY])
            .into_iter()
            .map(|(_, bytes)| self.codec.must_decode(&bytes))
            .collect()
    }

    /// Up to `max` unbonding delegations of one delegator
    pub fn get_unbonding_delegations(
        &self,
        ctx: &Context<'_>,
        delegator: &Address,
        max: usize,
    ) -> Vec<UnbondingDelegation> {
        ctx.prefix_iter(self.store_key, &keys::ubds_key(delegator))
            .into_iter()
            .take(max)
            .map(|(_, bytes)| self.codec.must_decode(&bytes))
            .collect()
    }

    pub fn get_unbonding_delegations_from_validator(
        &self,
        ctx: &Context<'_>,
        validator: &Address,
    ) -> Vec<UnbondingDelegation> {
        ctx.prefix_iter(self.store_key, &keys::ubds_by_val_key(validator))
            .into_iter()
            .map(|(key, _)| {
                let delegator = keys::address_at(&key, 1 + ADDRESS_LEN);
                self.get_unbonding_delegation(ctx, &delegator, validator).unwrap_or_else(|| {
                    panic!("unbonding index points at missing record {} -> {}", delegator, validator)
                })
            })
            .collect()
    }

    pub fn has_max_unbonding_delegation_entries(
        &self,
        ctx: &Context<'_>,
        delegator: &Address,
        validator: &Address,
    ) -> bool {
        let max = self.max_entries(ctx) as usize;
        self.get_unbonding_delegation(ctx, delegator, validator)
            .map_or(false, |ubd| ubd.entries.len() >= max)
    }

    pub fn set_unbonding_delegation(&self, ctx: &mut Context<'_>, ubd: &UnbondingDelegation) {
        self.put(ctx, &keys::ubd_key(&ubd.delegator, &ubd.validator), ubd);
        ctx.set(
            self.store_key,
            &keys::ubd_by_val_index_key(&ubd.validator, &ubd.delegator),
            Vec::new(),
        );
    }

    pub fn remove_unbonding_delegation(&self, ctx: &mut Context<'_>, ubd: &UnbondingDelegation) {
        ctx.delete(self.store_key, &keys::ubd_key(&ubd.delegator, &ubd.validator));
        ctx.delete(self.store_key, &keys::ubd_by_val_index_key(&ubd.validator, &ubd.delegator));
    }

    /// Append an entry, creating the record if needed
    pub fn set_unbonding_delegation_entry(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        validator: &Address,
        creation_height: Height,
        completion_time: Timestamp,
        balance: u128,
    ) -> UnbondingDelegation {
        let ubd = match self.get_unbonding_delegation(ctx, delegator, validator) {
            Some(mut ubd) => {
                ubd.add_entry(creation_height, completion_time, balance);
                ubd
            }
            None => UnbondingDelegation::new(*delegator, *validator, creation_height, completion_time, balance),
        };
        self.set_unbonding_delegation(ctx, &ubd);
        ubd
    }

    // ------------------------------------------------------------------
    // redelegations
    // ------------------------------------------------------------------

    pub fn get_redelegation(
        &self,
        ctx: &Context<'_>,
        delegator: &Address,
        src: &Address,
        dst: &Address,
    ) -> Option<Redelegation> {
        self.get(ctx, &keys::red_key(delegator, src, dst))
    }

    pub fn get_all_redelegations(&self, ctx: &Context<'_>) -> Vec<Redelegation> {
        ctx.prefix_iter(self.store_key, &[REDELEGATION_KEY])
            .into_iter()
            .map(|(_, bytes)| self.codec.must_decode(&bytes))
            .collect()
    }

    /// Up to `max` redelegations of one delegator
    pub fn get_redelegations(&self, ctx: &Context<'_>, delegator: &Address, max: usize) -> Vec<Redelegation> {
        ctx.prefix_iter(self.store_key, &keys::reds_key(delegator))
            .into_iter()
            .take(max)
            .map(|(_, bytes)| self.codec.must_decode(&bytes))
            .collect()
    }

    fn must_get_redelegation(&self, ctx: &Context<'_>, delegator: &Address, src: &Address, dst: &Address) -> Redelegation {
        self.get_redelegation(ctx, delegator, src, dst).unwrap_or_else(|| {
            panic!("redelegation index points at missing record {}: {} -> {}", delegator, src, dst)
        })
    }

    pub fn get_redelegations_from_src_validator(&self, ctx: &Context<'_>, src: &Address) -> Vec<Redelegation> {
        ctx.prefix_iter(self.store_key, &keys::reds_from_val_src_index_key(src))
            .into_iter()
            .map(|(key, _)| {
                let (delegator, src, dst) = keys::split_red_by_src_key(&key);
                self.must_get_redelegation(ctx, &delegator, &src, &dst)
            })
            .collect()
    }

    pub fn get_redelegations_to_dst_validator(&self, ctx: &Context<'_>, dst: &Address) -> Vec<Redelegation> {
        ctx.prefix_iter(self.store_key, &keys::reds_to_val_dst_index_key(dst))
            .into_iter()
            .map(|(key, _)| {
                let (delegator, src, dst) = keys::split_red_by_dst_key(&key);
                self.must_get_redelegation(ctx, &delegator, &src, &dst)
            })
            .collect()
    }

    /// Whether `delegator` has stake in flight into `validator` from any source
    pub fn has_receiving_redelegation(&self, ctx: &Context<'_>, delegator: &Address, validator: &Address) -> bool {
        !ctx
            .prefix_iter(self.store_key, &keys::reds_by_del_to_val_dst_index_key(delegator, validator))
            .is_empty()
    }

    pub fn has_max_redelegation_entries(
        &self,
        ctx: &Context<'_>,
        delegator: &Address,
        src: &Address,
        dst: &Address,
    ) -> bool {
        let max = self.max_entries(ctx) as usize;
        self.get_redelegation(ctx, delegator, src, dst)
            .map_or(false, |red| red.entries.len() >= max)
    }

    pub fn set_redelegation(&self, ctx: &mut Context<'_>, red: &Redelegation) {
        self.put(ctx, &keys::red_key(&red.delegator, &red.src, &red.dst), red);
        ctx.set(
            self.store_key,
            &keys::red_by_val_src_index_key(&red.delegator, &red.src, &red.dst),
            Vec::new(),
        );
        ctx.set(
            self.store_key,
            &keys::red_by_val_dst_index_key(&red.delegator, &red.src, &red.dst),
            Vec::new(),
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_redelegation_entry(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        src: &Address,
        dst: &Address,
        creation_height: Height,
        completion_time: Timestamp,
        balance: u128,
        shares_dst: Dec,
    ) -> Redelegation {
        let red = match self.get_redelegation(ctx, delegator, src, dst) {
            Some(mut red) => {
                red.add_entry(creation_height, completion_time, balance, shares_dst);
                red
            }
            None => Redelegation::new(
                *delegator,
                *src,
                *dst,
                creation_height,
                completion_time,
                balance,
                shares_dst,
            ),
        };
        self.set_redelegation(ctx, &red);
        red
    }

    pub fn remove_redelegation(&self, ctx: &mut Context<'_>, red: &Redelegation) {
        ctx.delete(self.store_key, &keys::red_key(&red.delegator, &red.src, &red.dst));
        ctx.delete(
            self.store_key,
            &keys::red_by_val_src_index_key(&red.delegator, &red.src, &red.dst),
        );
        ctx.delete(
            self.store_key,
            &keys::red_by_val_dst_index_key(&red.delegator, &red.src, &red.dst),
        );
    }

    // ------------------------------------------------------------------
    // maturity queues
    // ------------------------------------------------------------------

    pub fn get_ubd_queue_time_slice(&self, ctx: &Context<'_>, time: Timestamp) -> Vec<DvPair> {
        self.get(ctx, &keys::ubd_queue_key(time)).unwrap_or_default()
    }

    pub fn set_ubd_queue_time_slice(&self, ctx: &mut Context<'_>, time: Timestamp, pairs: &[DvPair]) {
        self.put(ctx, &keys::ubd_queue_key(time), &pairs);
    }

    pub fn insert_ubd_queue(&self, ctx: &mut Context<'_>, ubd: &UnbondingDelegation, completion_time: Timestamp) {
        let mut slice = self.get_ubd_queue_time_slice(ctx, completion_time);
        slice.push(DvPair {
            delegator: ubd.delegator,
            validator: ubd.validator,
        });
        self.set_ubd_queue_time_slice(ctx, completion_time, &slice);
    }

    /// Remove and return every pair queued at or before `now`, oldest bucket first
    pub fn dequeue_all_mature_ubd_queue(&self, ctx: &mut Context<'_>, now: Timestamp) -> Vec<DvPair> {
        let end = keys::queue_end_key(UNBONDING_QUEUE_KEY, now);
        let mut mature = Vec::new();
        for (key, bytes) in ctx.range(self.store_key, &[UNBONDING_QUEUE_KEY], &end) {
            let slice: Vec<DvPair> = self.codec.must_decode(&bytes);
            mature.extend(slice);
            ctx.delete(self.store_key, &key);
        }
        mature
    }

    pub fn get_redelegation_queue_time_slice(&self, ctx: &Context<'_>, time: Timestamp) -> Vec<DvvTriplet> {
        self.get(ctx, &keys::red_queue_key(time)).unwrap_or_default()
    }

    pub fn set_redelegation_queue_time_slice(&self, ctx: &mut Context<'_>, time: Timestamp, triplets: &[DvvTriplet]) {
        self.put(ctx, &keys::red_queue_key(time), &triplets);
    }

    pub fn insert_redelegation_queue(&self, ctx: &mut Context<'_>, red: &Redelegation, completion_time: Timestamp) {
        let mut slice = self.get_redelegation_queue_time_slice(ctx, completion_time);
        slice.push(DvvTriplet {
            delegator: red.delegator,
            src: red.src,
            dst: red.dst,
        });
        self.set_redelegation_queue_time_slice(ctx, completion_time, &slice);
    }

    /// Remove and return every triplet queued at or before `now`, oldest bucket first
    pub fn dequeue_all_mature_redelegation_queue(&self, ctx: &mut Context<'_>, now: Timestamp) -> Vec<DvvTriplet> {
        let end = keys::queue_end_key(REDELEGATION_QUEUE_KEY, now);
        let mut mature = Vec::new();
        for (key, bytes) in ctx.range(self.store_key, &[REDELEGATION_QUEUE_KEY], &end) {
            let slice: Vec<DvvTriplet> = self.codec.must_decode(&bytes);
            mature.extend(slice);
            ctx.delete(self.store_key, &key);
        }
        mature
    }
}
