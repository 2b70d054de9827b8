use super::Keeper;
use crate::codec::Codec;
use crate::context::{BlockHeader, Context};
use crate::keys;
use crate::types::Height;
use crate::validator::Validator;
use serde::{Deserialize, Serialize};

/// Header and validator set of a past block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalInfo {
    pub header: BlockHeader,
    /// Sorted by operator address
    pub valset: Vec<Validator>,
}

impl HistoricalInfo {
    pub fn new(header: BlockHeader, mut valset: Vec<Validator>) -> Self {
        valset.sort_by(|a, b| a.operator.cmp(&b.operator));
        Self { header, valset }
    }
}

impl<C: Codec> Keeper<C> {
    pub fn get_historical_info(&self, ctx: &Context<'_>, height: Height) -> Option<HistoricalInfo> {
        self.get(ctx, &keys::historical_info_key(height))
    }

    pub fn set_historical_info(&self, ctx: &mut Context<'_>, height: Height, info: &HistoricalInfo) {
        self.put(ctx, &keys::historical_info_key(height), info);
    }

    pub fn delete_historical_info(&self, ctx: &mut Context<'_>, height: Height) {
        ctx.delete(self.store_key, &keys::historical_info_key(height));
    }

    /// Snapshot the current validator set and prune snapshots that fell
    /// out of the `historical_entries` window
    pub fn track_historical_info(&self, ctx: &mut Context<'_>) {
        let entries = Height::from(self.historical_entries(ctx));
        let height = ctx.block_height();

        // entries to prune form a contiguous run ending at height - entries;
        // after a parameter decrease the run can be longer than one
        let mut prune = height - entries;
        while prune >= 0 && self.get_historical_info(ctx, prune).is_some() {
            self.delete_historical_info(ctx, prune);
            prune -= 1;
        }

        if entries == 0 {
            return;
        }

        let info = HistoricalInfo::new(ctx.header().clone(), self.get_last_validators(ctx));
        self.set_historical_info(ctx, height, &info);
    }
}
