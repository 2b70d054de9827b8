use super::Keeper;
use crate::signing_info::DOUBLE_SIGN_JAIL_END_TIME;
use tracing::{info, warn};
use zeratul_staking::{Codec, ConsAddress, Context, Height, Timestamp, ValidatorSet};

/// Blocks between a validator set change and consensus applying it
pub const VALIDATOR_UPDATE_DELAY: Height = 1;

impl<C: Codec> Keeper<C> {
    /// Record whether the validator at `address` signed the previous block
    /// and jail it for downtime once it misses too much of the window.
    ///
    /// Votes are for the previous block, whose validator set was chosen
    /// `VALIDATOR_UPDATE_DELAY` blocks before that, so downtime is slashed
    /// at `height - VALIDATOR_UPDATE_DELAY - 1`.
    ///
    /// # Panics
    ///
    /// When `address` has no pubkey relation or signing info: only bonded
    /// validators vote, and bonding creates both.
    pub fn handle_validator_signature(
        &self,
        ctx: &mut Context<'_>,
        sk: &dyn ValidatorSet,
        address: &ConsAddress,
        power: i64,
        signed: bool,
    ) {
        let height = ctx.block_height();
        if self.get_pubkey(ctx, address).is_none() {
            panic!("validator consensus address {} not found", address);
        }
        let mut signing_info = self
            .get_validator_signing_info(ctx, address)
            .unwrap_or_else(|| panic!("expected signing info for validator {} but not found", address));

        let params = self.params(ctx);
        let window = params.signed_blocks_window;

        let index = signing_info.index_offset % window;
        signing_info.index_offset += 1;

        let previous = self.get_missed_block(ctx, address, index);
        let missed = !signed;
        match (previous, missed) {
            (false, true) => {
                self.set_missed_block(ctx, address, index, true);
                signing_info.missed_blocks_counter += 1;
            }
            (true, false) => {
                self.set_missed_block(ctx, address, index, false);
                signing_info.missed_blocks_counter -= 1;
            }
            _ => {}
        }

        if missed {
            info!(
                height,
                validator = %address,
                missed = signing_info.missed_blocks_counter,
                threshold = params.min_signed_blocks(),
                "absent validator"
            );
        }

        let min_height = signing_info.start_height + window;
        if height > min_height && signing_info.missed_blocks_counter > params.max_missed_blocks() {
            match sk.validator_by_cons_addr(ctx, address) {
                Some(validator) if !validator.jailed => {
                    let distribution_height = height - VALIDATOR_UPDATE_DELAY - 1;
                    sk.slash(ctx, address, distribution_height, power, &params.slash_fraction_downtime);
                    sk.jail(ctx, address);

                    signing_info.jailed_until = ctx.block_time().saturating_add(params.downtime_jail_duration);
                    // a fresh window once the validator is back
                    signing_info.missed_blocks_counter = 0;
                    signing_info.index_offset = 0;
                    self.clear_missed_blocks(ctx, address);

                    warn!(
                        height,
                        validator = %address,
                        power,
                        jailed_until = %signing_info.jailed_until,
                        "slashed and jailed validator for downtime"
                    );
                }
                _ => info!(
                    validator = %address,
                    "validator would have been slashed for downtime, but was either not found in store or already jailed"
                ),
            }
        }

        self.set_validator_signing_info(ctx, &signing_info);
    }

    /// Slash, jail and tombstone the validator at `address` for signing two
    /// blocks at `infraction_height`.
    ///
    /// Evidence is ignored when the pubkey is unknown (the validator was
    /// removed), when it is older than `max_evidence_age`, when the
    /// validator is gone or unbonded, or when it was already tombstoned.
    pub fn handle_double_sign(
        &self,
        ctx: &mut Context<'_>,
        sk: &dyn ValidatorSet,
        address: &ConsAddress,
        infraction_height: Height,
        timestamp: Timestamp,
        power: i64,
    ) {
        let Some(pubkey) = self.get_pubkey(ctx, address) else {
            info!(validator = %address, "ignored double sign evidence for an unknown pubkey");
            return;
        };

        let age = ctx.block_time().saturating_duration_since(timestamp);
        let max_age = self.max_evidence_age(ctx);
        if age > max_age {
            info!(
                validator = %address,
                infraction_height,
                age_ms = age.as_millis() as u64,
                max_age_ms = max_age.as_millis() as u64,
                "ignored double sign evidence older than the max evidence age"
            );
            return;
        }

        let validator = match sk.validator_by_cons_addr(ctx, address) {
            Some(validator) if !validator.is_unbonded() => validator,
            _ => {
                info!(validator = %address, "ignored double sign evidence for an unbonded or removed validator");
                return;
            }
        };
        assert!(
            validator.consensus_pubkey == pubkey,
            "validator pubkey does not match for {}",
            address
        );

        let mut signing_info = self
            .get_validator_signing_info(ctx, address)
            .unwrap_or_else(|| panic!("expected signing info for validator {} but not found", address));
        if signing_info.tombstoned {
            info!(
                validator = %address,
                infraction_height,
                "ignored double sign evidence for an already tombstoned validator"
            );
            return;
        }

        // the set that signed at the infraction height was chosen one block earlier
        let distribution_height = infraction_height - VALIDATOR_UPDATE_DELAY;
        let fraction = self.slash_fraction_double_sign(ctx);
        sk.slash(ctx, address, distribution_height, power, &fraction);

        if !validator.jailed {
            sk.jail(ctx, address);
        }
        signing_info.jailed_until = DOUBLE_SIGN_JAIL_END_TIME;
        signing_info.tombstoned = true;
        self.set_validator_signing_info(ctx, &signing_info);

        warn!(
            validator = %address,
            infraction_height,
            power,
            fraction = %fraction,
            "slashed and tombstoned validator for double signing"
        );
    }
}
