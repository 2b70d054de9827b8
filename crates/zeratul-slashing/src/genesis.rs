//! Slashing state import and export

use crate::error::{Result, SlashingError};
use crate::keeper::Keeper;
use crate::params::Params;
use crate::signing_info::ValidatorSigningInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;
use zeratul_staking::{Codec, ConsAddress, Context, ValidatorSet};

/// Window positions a validator missed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedBlocks {
    pub address: ConsAddress,
    pub indexes: Vec<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub signing_infos: Vec<ValidatorSigningInfo>,
    pub missed_blocks: Vec<MissedBlocks>,
}

impl GenesisState {
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;

        let mut seen = BTreeSet::new();
        for info in &self.signing_infos {
            if !seen.insert(info.address) {
                return Err(SlashingError::InvalidGenesis(format!(
                    "duplicate signing info for {}",
                    info.address
                )));
            }
            if info.missed_blocks_counter < 0 || info.missed_blocks_counter > self.params.signed_blocks_window {
                return Err(SlashingError::InvalidGenesis(format!(
                    "missed blocks counter {} of {} outside the window",
                    info.missed_blocks_counter, info.address
                )));
            }
        }

        let window = 0..self.params.signed_blocks_window;
        for missed in &self.missed_blocks {
            if let Some(index) = missed.indexes.iter().find(|index| !window.contains(*index)) {
                return Err(SlashingError::InvalidGenesis(format!(
                    "missed block index {} of {} outside the window",
                    index, missed.address
                )));
            }
        }
        Ok(())
    }
}

/// Load slashing state. The pubkey relation is rebuilt from the
/// validators staking already holds, so staking genesis runs first.
pub fn init_genesis<C: Codec>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C>,
    sk: &dyn ValidatorSet,
    genesis: &GenesisState,
) -> Result<()> {
    genesis.validate()?;

    for validator in sk.validators(ctx) {
        keeper.add_pubkey(ctx, &validator.consensus_pubkey);
    }
    for signing_info in &genesis.signing_infos {
        keeper.set_validator_signing_info(ctx, signing_info);
    }
    for missed in &genesis.missed_blocks {
        for index in &missed.indexes {
            keeper.set_missed_block(ctx, &missed.address, *index, true);
        }
    }
    keeper.set_params(ctx, &genesis.params);

    info!(
        signing_infos = genesis.signing_infos.len(),
        "initialized slashing genesis"
    );
    Ok(())
}

pub fn export_genesis<C: Codec>(ctx: &Context<'_>, keeper: &Keeper<C>) -> GenesisState {
    let signing_infos = keeper.get_all_signing_infos(ctx);
    let missed_blocks = signing_infos
        .iter()
        .map(|info| MissedBlocks {
            address: info.address,
            indexes: keeper.get_missed_blocks(ctx, &info.address),
        })
        .filter(|missed| !missed.indexes.is_empty())
        .collect();

    GenesisState {
        params: keeper.params(ctx),
        signing_infos,
        missed_blocks,
    }
}
