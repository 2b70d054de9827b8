//! Block lifecycle entry point

use crate::keeper::Keeper;
use tracing::error;
use zeratul_staking::{Codec, ConsAddress, Context, Height, Timestamp, ValidatorSet};

/// A validator's vote on the previous block, as reported by consensus
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteInfo {
    pub address: ConsAddress,
    pub power: i64,
    pub signed_last_block: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvidenceKind {
    DuplicateVote,
    /// Anything consensus reports that this module does not punish
    Other(String),
}

/// Misbehaviour reported by consensus
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub address: ConsAddress,
    pub height: Height,
    pub time: Timestamp,
    /// Validator power at `height`
    pub power: i64,
}

/// Update liveness for every vote on the last block, then punish any
/// double signing consensus found.
pub fn begin_blocker<C: Codec>(
    ctx: &mut Context<'_>,
    keeper: &Keeper<C>,
    sk: &dyn ValidatorSet,
    votes: &[VoteInfo],
    evidence: &[Evidence],
) {
    for vote in votes {
        keeper.handle_validator_signature(ctx, sk, &vote.address, vote.power, vote.signed_last_block);
    }

    for ev in evidence {
        match &ev.kind {
            EvidenceKind::DuplicateVote => {
                keeper.handle_double_sign(ctx, sk, &ev.address, ev.height, ev.time, ev.power)
            }
            EvidenceKind::Other(kind) => {
                error!(kind = %kind, validator = %ev.address, "ignored unknown evidence type")
            }
        }
    }
}
