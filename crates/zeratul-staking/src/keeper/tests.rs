use super::*;
use crate::abci::{begin_blocker, end_blocker};
use crate::bank::BankError;
use crate::error::StakingError;
use crate::handler::{handle_msg, MsgResponse};
use crate::invariants::all_invariants;
use crate::math::Dec;
use crate::msg::{MsgBeginRedelegate, MsgDelegate, MsgEditValidator, MsgUndelegate, StakingMsg};
use crate::store::MemStore;
use crate::testing::{self, addr, power_tokens, pubkey, stake, HookEvent};
use crate::types::{Address, Timestamp};
use crate::validator::{BondStatus, Description};

const GENESIS_TIME: Timestamp = Timestamp::from_secs(1_000);
const BLOCK: Duration = Duration::from_secs(5);

fn with_max_validators(ctx: &mut Context<'_>, keeper: &Keeper, max_validators: u32) {
    let params = Params {
        max_validators,
        ..Params::default()
    };
    keeper.set_params(ctx, &params);
}

fn undelegate(ctx: &mut Context<'_>, keeper: &Keeper, delegator: Address, validator: Address, amount: u128) -> Timestamp {
    let shares = keeper
        .validate_unbond_amount(ctx, &delegator, &validator, amount)
        .unwrap();
    keeper.undelegate(ctx, &delegator, &validator, &shares).unwrap()
}

fn redelegate(
    ctx: &mut Context<'_>,
    keeper: &Keeper,
    delegator: Address,
    src: Address,
    dst: Address,
    amount: u128,
) -> crate::error::Result<Timestamp> {
    let shares = keeper.validate_unbond_amount(ctx, &delegator, &src, amount)?;
    keeper.begin_redelegation(ctx, &delegator, &src, &dst, &shares)
}

fn status(ctx: &Context<'_>, keeper: &Keeper, operator: &Address) -> BondStatus {
    keeper.get_validator(ctx, operator).unwrap().status
}

#[test]
fn test_created_validator_bonds_at_end_block() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 1);

    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    assert_eq!(status(&ctx, &keeper, &operator), BondStatus::Unbonded);
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), power_tokens(10));

    let updates = end_blocker(&mut ctx, &keeper);

    let validator = keeper.get_validator(&ctx, &operator).unwrap();
    assert_eq!(validator.status, BondStatus::Bonded);
    assert_eq!(validator.consensus_power(), 10);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].pub_key, pubkey(1));
    assert_eq!(updates[0].power, 10);
    assert_eq!(keeper.bonded_pool_balance(&ctx), power_tokens(10));
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), 0);
    assert_eq!(keeper.last_total_power(&ctx), 10);
}

#[test]
fn test_slash_at_current_height_reports_effective_fraction() {
    let (keeper, bank, hooks) = testing::keeper_with_hooks();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);
    hooks.clear();

    let half = Dec::new_with_prec(5, 1);
    keeper.slash(&mut ctx, &pubkey(1).address(), 1, 10, &half);

    let validator = keeper.get_validator(&ctx, &operator).unwrap();
    assert_eq!(validator.tokens, power_tokens(5));
    assert_eq!(keeper.bonded_pool_balance(&ctx), power_tokens(5));
    assert_eq!(
        hooks.events(),
        vec![
            HookEvent::BeforeValidatorModified(operator),
            HookEvent::BeforeValidatorSlashed(operator, half),
        ]
    );
}

#[test]
fn test_undelegation_pays_out_after_unbonding_period() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, validator, 100);
    assert_eq!(bank.balance(&ctx, &delegator, "stake"), 0);

    let msg = StakingMsg::Undelegate(MsgUndelegate {
        delegator_address: delegator,
        validator_address: validator,
        amount: stake(40),
    });
    let completion = GENESIS_TIME.saturating_add(keeper.unbonding_time(&ctx));
    assert_eq!(
        handle_msg(&mut ctx, &keeper, &msg).unwrap(),
        MsgResponse::CompletionTime(completion)
    );

    let ubd = keeper.get_unbonding_delegation(&ctx, &delegator, &validator).unwrap();
    assert_eq!(ubd.entries.len(), 1);
    assert_eq!(ubd.entries[0].balance, 40);
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), 40);

    // nothing is paid out before maturity
    end_blocker(&mut ctx, &keeper);
    assert!(keeper.get_unbonding_delegation(&ctx, &delegator, &validator).is_some());

    let period = keeper.unbonding_time(&ctx);
    testing::next_block(&mut ctx, period);
    end_blocker(&mut ctx, &keeper);

    assert_eq!(bank.balance(&ctx, &delegator, "stake"), 40);
    assert!(keeper.get_unbonding_delegation(&ctx, &delegator, &validator).is_none());
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), 0);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_redelegation_to_same_validator_rejected() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let before = crate::genesis::export_genesis(&ctx, &keeper);

    let msg = StakingMsg::BeginRedelegate(MsgBeginRedelegate {
        delegator_address: validator,
        validator_src_address: validator,
        validator_dst_address: validator,
        amount: stake(power_tokens(1)),
    });
    assert!(matches!(
        handle_msg(&mut ctx, &keeper, &msg),
        Err(StakingError::SelfRedelegation)
    ));

    let shares = Dec::from_int(power_tokens(1));
    assert!(matches!(
        keeper.begin_redelegation(&mut ctx, &validator, &validator, &validator, &shares),
        Err(StakingError::SelfRedelegation)
    ));
    assert_eq!(crate::genesis::export_genesis(&ctx, &keeper), before);
}

#[test]
fn test_power_drop_swaps_bonded_validator() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 1);

    let first = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(20));
    let second = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(10));
    let updates = end_blocker(&mut ctx, &keeper);
    assert_eq!(updates.len(), 1);
    assert_eq!(status(&ctx, &keeper, &first), BondStatus::Bonded);
    assert_eq!(status(&ctx, &keeper, &second), BondStatus::Unbonded);

    testing::next_block(&mut ctx, BLOCK);
    undelegate(&mut ctx, &keeper, first, first, power_tokens(15));
    let updates = end_blocker(&mut ctx, &keeper);

    assert_eq!(updates.len(), 2);
    let zero: Vec<_> = updates.iter().filter(|u| u.power == 0).collect();
    let nonzero: Vec<_> = updates.iter().filter(|u| u.power != 0).collect();
    assert_eq!(zero.len(), 1);
    assert_eq!(zero[0].pub_key, pubkey(1));
    assert_eq!(nonzero.len(), 1);
    assert_eq!(nonzero[0].pub_key, pubkey(2));
    assert_eq!(nonzero[0].power, 10);

    assert_eq!(status(&ctx, &keeper, &first), BondStatus::Unbonding);
    assert_eq!(status(&ctx, &keeper, &second), BondStatus::Bonded);
    assert_eq!(keeper.bonded_pool_balance(&ctx), power_tokens(10));
    assert_eq!(keeper.last_total_power(&ctx), 10);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_slashing_redelegation_can_remove_drained_destination() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 1);

    let src = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(20));
    let dst = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(5));
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, src, power_tokens(10));

    testing::next_block(&mut ctx, BLOCK);
    redelegate(&mut ctx, &keeper, delegator, src, dst, power_tokens(10)).unwrap();
    // the destination operator leaves, so only the redelegated stake remains
    undelegate(&mut ctx, &keeper, dst, dst, power_tokens(5));
    let remaining = keeper.get_validator(&ctx, &dst).unwrap();
    assert!(remaining.jailed);
    assert_eq!(remaining.status, BondStatus::Unbonded);
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    keeper.slash(&mut ctx, &pubkey(1).address(), 2, 30, &Dec::one());

    assert!(keeper.get_validator(&ctx, &dst).is_none());
    assert!(keeper.get_delegation(&ctx, &delegator, &dst).is_none());
    assert_eq!(keeper.get_validator(&ctx, &src).unwrap().tokens, 0);
    assert_eq!(keeper.bonded_pool_balance(&ctx), 0);
    // only the destination operator's own unbonding is left
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), power_tokens(5));
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_equal_power_ties_go_to_earlier_indexed_validator() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 1);

    let first = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let second = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(10));
    end_blocker(&mut ctx, &keeper);
    assert_eq!(status(&ctx, &keeper, &first), BondStatus::Bonded);
    assert_eq!(status(&ctx, &keeper, &second), BondStatus::Unbonded);

    // a sub-power change keeps the position
    testing::next_block(&mut ctx, BLOCK);
    testing::delegate(&mut ctx, &keeper, &bank, addr(9), first, 1);
    assert!(end_blocker(&mut ctx, &keeper).is_empty());

    // leaving and regaining the power level re-queues behind the other
    testing::next_block(&mut ctx, BLOCK);
    undelegate(&mut ctx, &keeper, first, first, power_tokens(1));
    testing::delegate(&mut ctx, &keeper, &bank, addr(9), first, power_tokens(1));
    assert_eq!(keeper.get_validator(&ctx, &first).unwrap().potential_consensus_power(), 10);
    end_blocker(&mut ctx, &keeper);

    assert_eq!(status(&ctx, &keeper, &first), BondStatus::Unbonding);
    assert_eq!(status(&ctx, &keeper, &second), BondStatus::Bonded);
}

#[test]
fn test_slash_at_current_height_skips_entries() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, validator, power_tokens(4));
    undelegate(&mut ctx, &keeper, delegator, validator, power_tokens(2));

    let half = Dec::new_with_prec(5, 1);
    keeper.slash(&mut ctx, &pubkey(1).address(), 2, 12, &half);
    let ubd = keeper.get_unbonding_delegation(&ctx, &delegator, &validator).unwrap();
    assert_eq!(ubd.entries[0].balance, power_tokens(2));
    assert_eq!(keeper.get_validator(&ctx, &validator).unwrap().tokens, power_tokens(6));

    // the same infraction seen a block later reaches the entry
    testing::next_block(&mut ctx, BLOCK);
    keeper.slash(&mut ctx, &pubkey(1).address(), 2, 12, &half);
    let ubd = keeper.get_unbonding_delegation(&ctx, &delegator, &validator).unwrap();
    assert_eq!(ubd.entries[0].balance, power_tokens(1));
    assert_eq!(ubd.entries[0].initial_balance, power_tokens(2));
    assert_eq!(keeper.get_validator(&ctx, &validator).unwrap().tokens, power_tokens(1));
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), power_tokens(1));
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_slash_burns_at_most_current_tokens() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);
    let supply = bank.supply(&ctx, "stake");

    keeper.slash(&mut ctx, &pubkey(1).address(), 1, 1_000, &Dec::one());

    let slashed = keeper.get_validator(&ctx, &validator).unwrap();
    assert_eq!(slashed.tokens, 0);
    assert!(slashed.invalid_ex_rate());
    assert_eq!(bank.supply(&ctx, "stake"), supply - power_tokens(10));

    // worthless shares cannot be bought
    testing::fund(&mut ctx, &bank, &addr(9), 10);
    let msg = StakingMsg::Delegate(MsgDelegate {
        delegator_address: addr(9),
        validator_address: validator,
        amount: stake(10),
    });
    assert!(matches!(
        handle_msg(&mut ctx, &keeper, &msg),
        Err(StakingError::DelegatorShareExRateInvalid)
    ));
    assert_eq!(bank.balance(&ctx, &addr(9), "stake"), 10);
}

#[test]
fn test_unbonded_validator_removed_when_fully_undelegated() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(3));
    undelegate(&mut ctx, &keeper, operator, operator, power_tokens(3));

    assert!(keeper.get_validator(&ctx, &operator).is_none());
    assert!(keeper.get_validator_by_cons_addr(&ctx, &pubkey(1).address()).is_none());
    assert!(keeper.validators_by_power_desc(&ctx).is_empty());

    let period = keeper.unbonding_time(&ctx);
    testing::next_block(&mut ctx, period);
    end_blocker(&mut ctx, &keeper);
    assert_eq!(bank.balance(&ctx, &operator, "stake"), power_tokens(3));
}

#[test]
fn test_bonded_validator_removed_after_unbonding_period() {
    let (keeper, bank, hooks) = testing::keeper_with_hooks();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(3));
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    undelegate(&mut ctx, &keeper, operator, operator, power_tokens(3));
    let validator = keeper.get_validator(&ctx, &operator).unwrap();
    assert!(validator.jailed);
    assert_eq!(validator.tokens, 0);
    assert!(validator.delegator_shares.is_zero());

    let updates = end_blocker(&mut ctx, &keeper);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].power, 0);
    assert_eq!(status(&ctx, &keeper, &operator), BondStatus::Unbonding);

    let period = keeper.unbonding_time(&ctx);
    testing::next_block(&mut ctx, period);
    end_blocker(&mut ctx, &keeper);

    assert!(keeper.get_validator(&ctx, &operator).is_none());
    assert!(hooks
        .events()
        .contains(&HookEvent::AfterValidatorRemoved(pubkey(1).address(), operator)));
    assert_eq!(bank.balance(&ctx, &operator, "stake"), power_tokens(3));
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_failed_message_leaves_no_writes() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    // the validator record is written before the self-delegation fails
    testing::fund(&mut ctx, &bank, &addr(1), power_tokens(1));
    let msg = StakingMsg::CreateValidator(testing::create_validator_msg(1, power_tokens(2)));
    let err = handle_msg(&mut ctx, &keeper, &msg).unwrap_err();
    assert!(matches!(
        err,
        StakingError::Bank(BankError::InsufficientFunds { .. })
    ));

    assert!(keeper.get_validator(&ctx, &addr(1)).is_none());
    assert!(keeper.get_validator_by_cons_addr(&ctx, &pubkey(1).address()).is_none());
    assert!(keeper.validators_by_power_desc(&ctx).is_empty());
    assert_eq!(bank.balance(&ctx, &addr(1), "stake"), power_tokens(1));
}

#[test]
fn test_create_validator_rejections() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(1));
    testing::fund(&mut ctx, &bank, &addr(2), power_tokens(10));

    let msg = StakingMsg::CreateValidator(testing::create_validator_msg(1, power_tokens(1)));
    assert!(matches!(handle_msg(&mut ctx, &keeper, &msg), Err(StakingError::ValidatorOwnerExists)));

    let mut reused_key = testing::create_validator_msg(2, power_tokens(1));
    reused_key.pubkey = pubkey(1);
    let msg = StakingMsg::CreateValidator(reused_key);
    assert!(matches!(handle_msg(&mut ctx, &keeper, &msg), Err(StakingError::ValidatorPubKeyExists)));

    let mut wrong_denom = testing::create_validator_msg(2, power_tokens(1));
    wrong_denom.value.denom = "atom".into();
    let msg = StakingMsg::CreateValidator(wrong_denom);
    assert!(matches!(handle_msg(&mut ctx, &keeper, &msg), Err(StakingError::BadDenom { .. })));

    let mut long_moniker = testing::create_validator_msg(2, power_tokens(1));
    long_moniker.description = Description::new("m".repeat(100));
    let msg = StakingMsg::CreateValidator(long_moniker);
    assert!(matches!(
        handle_msg(&mut ctx, &keeper, &msg),
        Err(StakingError::DescriptionTooLong { field: "moniker", .. })
    ));
}

#[test]
fn test_unsupported_pubkey_type_rejected() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME))
        .with_consensus_params(crate::context::ConsensusParams::default());
    testing::fund(&mut ctx, &bank, &addr(1), power_tokens(1));

    let mut msg = testing::create_validator_msg(1, power_tokens(1));
    msg.pubkey = crate::types::ConsPubKey::Secp256k1([7; 33]);
    assert!(matches!(
        handle_msg(&mut ctx, &keeper, &StakingMsg::CreateValidator(msg)),
        Err(StakingError::ValidatorPubKeyTypeNotSupported(crate::types::PubKeyType::Secp256k1))
    ));
}

#[test]
fn test_self_delegation_below_minimum_jails() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    testing::fund(&mut ctx, &bank, &addr(1), power_tokens(10));
    let mut msg = testing::create_validator_msg(1, power_tokens(10));
    msg.min_self_delegation = power_tokens(5);
    handle_msg(&mut ctx, &keeper, &StakingMsg::CreateValidator(msg)).unwrap();
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    undelegate(&mut ctx, &keeper, addr(1), addr(1), power_tokens(4));
    assert!(!keeper.get_validator(&ctx, &addr(1)).unwrap().jailed);

    undelegate(&mut ctx, &keeper, addr(1), addr(1), power_tokens(2));
    assert!(keeper.get_validator(&ctx, &addr(1)).unwrap().jailed);

    let updates = end_blocker(&mut ctx, &keeper);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].power, 0);
    assert_eq!(status(&ctx, &keeper, &addr(1)), BondStatus::Unbonding);
}

#[test]
fn test_transitive_redelegation_rejected() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let v1 = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let v2 = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(10));
    let v3 = testing::create_validator(&mut ctx, &keeper, &bank, 3, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, v1, power_tokens(4));
    redelegate(&mut ctx, &keeper, delegator, v1, v2, power_tokens(2)).unwrap();

    assert!(matches!(
        redelegate(&mut ctx, &keeper, delegator, v2, v3, power_tokens(1)),
        Err(StakingError::TransitiveRedelegation)
    ));
    // the stake that never moved is free to go elsewhere
    redelegate(&mut ctx, &keeper, delegator, v1, v3, power_tokens(1)).unwrap();

    let reds = keeper.get_redelegations(&ctx, &delegator, 10);
    assert_eq!(reds.len(), 2);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_redelegation_from_unbonded_completes_immediately() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let v1 = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let v2 = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(10));
    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, v1, power_tokens(4));

    let completion = redelegate(&mut ctx, &keeper, delegator, v1, v2, power_tokens(4)).unwrap();
    assert_eq!(completion, ctx.block_time());
    assert!(keeper.get_redelegation(&ctx, &delegator, &v1, &v2).is_none());
    assert!(keeper.get_delegation(&ctx, &delegator, &v1).is_none());
    assert_eq!(
        keeper.get_delegation(&ctx, &delegator, &v2).unwrap().shares,
        Dec::from_int(power_tokens(4))
    );
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_redelegation_matures_and_moves_pools() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 1);

    let src = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let dst = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(1));
    end_blocker(&mut ctx, &keeper);

    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, src, power_tokens(2));
    let bonded = keeper.bonded_pool_balance(&ctx);
    let msg = StakingMsg::BeginRedelegate(MsgBeginRedelegate {
        delegator_address: delegator,
        validator_src_address: src,
        validator_dst_address: dst,
        amount: stake(power_tokens(2)),
    });
    let completion = ctx.block_time().saturating_add(keeper.unbonding_time(&ctx));
    assert_eq!(
        handle_msg(&mut ctx, &keeper, &msg).unwrap(),
        MsgResponse::CompletionTime(completion)
    );
    // bonded source, unbonded destination
    assert_eq!(keeper.bonded_pool_balance(&ctx), bonded - power_tokens(2));

    let period = keeper.unbonding_time(&ctx);
    testing::next_block(&mut ctx, period);
    end_blocker(&mut ctx, &keeper);
    assert!(keeper.get_redelegation(&ctx, &delegator, &src, &dst).is_none());
    assert!(keeper.get_delegation(&ctx, &delegator, &dst).is_some());
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_max_unbonding_entries() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    keeper.set_params(
        &mut ctx,
        &Params {
            max_entries: 2,
            ..Params::default()
        },
    );

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, validator, 30);
    undelegate(&mut ctx, &keeper, delegator, validator, 10);
    undelegate(&mut ctx, &keeper, delegator, validator, 10);

    let shares = keeper
        .validate_unbond_amount(&ctx, &delegator, &validator, 10)
        .unwrap();
    assert!(matches!(
        keeper.undelegate(&mut ctx, &delegator, &validator, &shares),
        Err(StakingError::MaxUnbondingDelegationEntries)
    ));
}

#[test]
fn test_unbond_amount_above_delegation_rejected() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    testing::delegate(&mut ctx, &keeper, &bank, addr(9), validator, 30);

    assert!(matches!(
        keeper.validate_unbond_amount(&ctx, &addr(9), &validator, 31),
        Err(StakingError::BadSharesAmount)
    ));
    assert!(matches!(
        keeper.validate_unbond_amount(&ctx, &addr(8), &validator, 1),
        Err(StakingError::NoDelegation)
    ));
}

#[test]
fn test_jailed_validator_rebonds_after_unjail() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    keeper.jail(&mut ctx, &pubkey(1).address());
    end_blocker(&mut ctx, &keeper);
    let unbonding = keeper.get_validator(&ctx, &operator).unwrap();
    assert_eq!(unbonding.status, BondStatus::Unbonding);
    assert_eq!(unbonding.unbonding_height, 2);
    assert_eq!(
        keeper.get_validator_queue_time_slice(&ctx, unbonding.unbonding_completion_time),
        vec![operator]
    );
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), power_tokens(10));

    testing::next_block(&mut ctx, BLOCK);
    keeper.unjail(&mut ctx, &pubkey(1).address());
    let updates = end_blocker(&mut ctx, &keeper);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].power, 10);

    let bonded = keeper.get_validator(&ctx, &operator).unwrap();
    assert_eq!(bonded.status, BondStatus::Bonded);
    assert_eq!(bonded.unbonding_height, 0);
    assert!(keeper
        .get_validator_queue_time_slice(&ctx, unbonding.unbonding_completion_time)
        .is_empty());
    assert_eq!(keeper.bonded_pool_balance(&ctx), power_tokens(10));
}

#[test]
fn test_slashing_unbonding_validator_burns_not_bonded() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);
    testing::next_block(&mut ctx, BLOCK);
    keeper.jail(&mut ctx, &pubkey(1).address());
    end_blocker(&mut ctx, &keeper);

    keeper.slash(&mut ctx, &pubkey(1).address(), 2, 10, &Dec::new_with_prec(1, 1));
    assert_eq!(keeper.get_validator(&ctx, &operator).unwrap().tokens, power_tokens(9));
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), power_tokens(9));
    assert_eq!(keeper.bonded_pool_balance(&ctx), 0);
}

#[test]
fn test_slashing_unknown_validator_is_a_noop() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let before = crate::genesis::export_genesis(&ctx, &keeper);

    keeper.slash(&mut ctx, &pubkey(7).address(), 1, 10, &Dec::one());
    assert_eq!(crate::genesis::export_genesis(&ctx, &keeper), before);
}

#[test]
#[should_panic(expected = "future infraction")]
fn test_slashing_future_infraction_panics() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);
    keeper.slash(&mut ctx, &pubkey(1).address(), 5, 10, &Dec::one());
}

#[test]
fn test_hook_sequence_for_create_and_bond() {
    let (keeper, bank, hooks) = testing::keeper_with_hooks();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(1));
    end_blocker(&mut ctx, &keeper);

    assert_eq!(
        hooks.events(),
        vec![
            HookEvent::AfterValidatorCreated(operator),
            HookEvent::BeforeDelegationCreated(operator, operator),
            HookEvent::AfterDelegationModified(operator, operator),
            HookEvent::AfterValidatorBonded(pubkey(1).address(), operator),
        ]
    );
}

#[test]
fn test_edit_validator_commission_and_min_self_delegation() {
    let (keeper, bank, hooks) = testing::keeper_with_hooks();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    let operator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    hooks.clear();

    let edit = |rate: Option<Dec>, min_self_delegation: Option<u128>| {
        StakingMsg::EditValidator(MsgEditValidator {
            description: Description {
                moniker: Description::DO_NOT_MODIFY.into(),
                identity: Description::DO_NOT_MODIFY.into(),
                website: Description::DO_NOT_MODIFY.into(),
                security_contact: Description::DO_NOT_MODIFY.into(),
                details: Description::DO_NOT_MODIFY.into(),
            },
            validator_address: operator,
            commission_rate: rate,
            min_self_delegation,
        })
    };

    // commission was set at creation, inside the update interval
    let msg = edit(Some(Dec::new_with_prec(11, 2)), None);
    assert!(matches!(
        handle_msg(&mut ctx, &keeper, &msg),
        Err(StakingError::CommissionUpdateTooSoon)
    ));

    testing::next_block(&mut ctx, Duration::from_secs(24 * 60 * 60));
    handle_msg(&mut ctx, &keeper, &msg).unwrap();
    let validator = keeper.get_validator(&ctx, &operator).unwrap();
    assert_eq!(validator.commission.rates.rate, Dec::new_with_prec(11, 2));
    assert_eq!(validator.commission.update_time, ctx.block_time());
    assert_eq!(validator.description.moniker, "validator-1");
    assert_eq!(hooks.events(), vec![HookEvent::BeforeValidatorModified(operator)]);

    assert!(matches!(
        handle_msg(&mut ctx, &keeper, &edit(None, Some(power_tokens(11)))),
        Err(StakingError::SelfDelegationBelowMinimum)
    ));
    handle_msg(&mut ctx, &keeper, &edit(None, Some(power_tokens(2)))).unwrap();
    assert!(matches!(
        handle_msg(&mut ctx, &keeper, &edit(None, Some(power_tokens(1)))),
        Err(StakingError::MinSelfDelegationDecreased)
    ));
    assert_eq!(
        keeper.get_validator(&ctx, &operator).unwrap().min_self_delegation,
        power_tokens(2)
    );
}

#[test]
fn test_historical_info_window() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    keeper.set_params(
        &mut ctx,
        &Params {
            historical_entries: 2,
            ..Params::default()
        },
    );
    testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(1));
    testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(1));
    end_blocker(&mut ctx, &keeper);

    for _ in 0..3 {
        testing::next_block(&mut ctx, BLOCK);
        begin_blocker(&mut ctx, &keeper);
    }

    assert!(keeper.get_historical_info(&ctx, 2).is_none());
    let latest = keeper.get_historical_info(&ctx, 4).unwrap();
    assert_eq!(latest.header.height, 4);
    let operators: Vec<Address> = latest.valset.iter().map(|v| v.operator).collect();
    assert_eq!(operators, vec![addr(1), addr(2)]);
    assert!(keeper.get_historical_info(&ctx, 3).is_some());
}

#[test]
fn test_invariants_hold_across_mixed_operations() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 2);

    let v1 = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let v2 = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(7));
    let v3 = testing::create_validator(&mut ctx, &keeper, &bank, 3, power_tokens(3));
    end_blocker(&mut ctx, &keeper);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));

    let (alice, bob) = (addr(20), addr(21));
    testing::next_block(&mut ctx, BLOCK);
    testing::delegate(&mut ctx, &keeper, &bank, alice, v1, 1_234_567);
    testing::delegate(&mut ctx, &keeper, &bank, bob, v3, power_tokens(6));
    undelegate(&mut ctx, &keeper, alice, v1, 234_567);
    redelegate(&mut ctx, &keeper, alice, v1, v3, 500_000).unwrap();
    end_blocker(&mut ctx, &keeper);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));

    testing::next_block(&mut ctx, BLOCK);
    keeper.slash(&mut ctx, &pubkey(1).address(), 2, 11, &Dec::new_with_prec(1, 1));
    keeper.slash(&mut ctx, &pubkey(3).address(), 1, 9, &Dec::new_with_prec(5, 2));
    redelegate(&mut ctx, &keeper, bob, v3, v2, power_tokens(2)).unwrap();
    end_blocker(&mut ctx, &keeper);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));

    let period = keeper.unbonding_time(&ctx);
    testing::next_block(&mut ctx, period);
    end_blocker(&mut ctx, &keeper);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
    assert!(keeper.get_all_unbonding_delegations(&ctx).is_empty());
    assert!(keeper.get_all_redelegations(&ctx).is_empty());
}

#[test]
fn test_queries_by_delegator_and_validator() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 1);

    let v1 = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let v2 = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(1));
    end_blocker(&mut ctx, &keeper);

    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, v1, power_tokens(3));
    undelegate(&mut ctx, &keeper, delegator, v1, power_tokens(1));
    redelegate(&mut ctx, &keeper, delegator, v1, v2, power_tokens(1)).unwrap();

    assert_eq!(keeper.get_validators(&ctx, 1).len(), 1);
    let bonded = keeper.get_bonded_validators_by_power(&ctx);
    assert_eq!(bonded.iter().map(|v| v.operator).collect::<Vec<_>>(), vec![v1]);
    assert_eq!(bonded[0].tokens, power_tokens(11));
    assert_eq!(keeper.total_bonded_tokens(&ctx), power_tokens(11));

    let delegations = keeper.get_delegator_delegations(&ctx, &delegator, 10);
    assert_eq!(delegations.iter().map(|d| d.validator).collect::<Vec<_>>(), vec![v1, v2]);
    assert_eq!(keeper.get_delegator_delegations(&ctx, &delegator, 1).len(), 1);

    let ubds = keeper.get_unbonding_delegations(&ctx, &delegator, 10);
    assert_eq!(ubds.len(), 1);
    assert_eq!(ubds[0].validator, v1);

    let incoming = keeper.get_redelegations_to_dst_validator(&ctx, &v2);
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].src, v1);
}

#[test]
fn test_unjailed_validator_queues_behind_equal_power() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));
    with_max_validators(&mut ctx, &keeper, 1);

    let first = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let second = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(10));
    end_blocker(&mut ctx, &keeper);
    assert_eq!(status(&ctx, &keeper, &first), BondStatus::Bonded);

    testing::next_block(&mut ctx, BLOCK);
    keeper.jail(&mut ctx, &pubkey(1).address());
    end_blocker(&mut ctx, &keeper);
    assert_eq!(status(&ctx, &keeper, &second), BondStatus::Bonded);

    testing::next_block(&mut ctx, BLOCK);
    keeper.unjail(&mut ctx, &pubkey(1).address());
    assert!(end_blocker(&mut ctx, &keeper).is_empty());

    assert_eq!(status(&ctx, &keeper, &first), BondStatus::Unbonding);
    assert_eq!(status(&ctx, &keeper, &second), BondStatus::Bonded);
    assert_eq!(keeper.last_total_power(&ctx), 10);
}

#[test]
#[should_panic(expected = "completing unbonding of")]
fn test_failed_unbonding_payout_panics() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, validator, 100);
    undelegate(&mut ctx, &keeper, delegator, validator, 40);
    // the pool no longer backs the entry
    bank.burn_coins(&mut ctx, NOT_BONDED_POOL_NAME, &stake(40)).unwrap();

    let period = keeper.unbonding_time(&ctx);
    testing::next_block(&mut ctx, period);
    end_blocker(&mut ctx, &keeper);
}

#[test]
fn test_slash_reaches_unbonding_entries_from_infraction_height() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, validator, power_tokens(4));
    undelegate(&mut ctx, &keeper, delegator, validator, power_tokens(1));
    testing::next_block(&mut ctx, BLOCK);
    undelegate(&mut ctx, &keeper, delegator, validator, power_tokens(1));
    let supply = bank.supply(&ctx, "stake");

    testing::next_block(&mut ctx, BLOCK);
    let half = Dec::new_with_prec(5, 1);
    keeper.slash(&mut ctx, &pubkey(1).address(), 3, 13, &half);

    let ubd = keeper.get_unbonding_delegation(&ctx, &delegator, &validator).unwrap();
    assert_eq!(ubd.entries.len(), 2);
    // created at height 2, before the infraction
    assert_eq!(ubd.entries[0].creation_height, 2);
    assert_eq!(ubd.entries[0].balance, power_tokens(1));
    assert_eq!(ubd.entries[1].creation_height, 3);
    assert_eq!(ubd.entries[1].balance, power_tokens(1) / 2);

    // 6.5 power owed, half a power of it taken from the unbonding entry
    assert_eq!(keeper.get_validator(&ctx, &validator).unwrap().tokens, power_tokens(6));
    assert_eq!(keeper.bonded_pool_balance(&ctx), power_tokens(6));
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), power_tokens(1) + power_tokens(1) / 2);
    assert_eq!(bank.supply(&ctx, "stake"), supply - power_tokens(6) - power_tokens(1) / 2);
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_slash_skips_mature_unbonding_entries() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let validator = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    testing::next_block(&mut ctx, BLOCK);
    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, validator, power_tokens(4));
    undelegate(&mut ctx, &keeper, delegator, validator, power_tokens(2));

    // matured but not yet swept by an end block
    let period = keeper.unbonding_time(&ctx);
    testing::next_block(&mut ctx, period);
    keeper.slash(&mut ctx, &pubkey(1).address(), 2, 14, &Dec::new_with_prec(5, 1));

    let ubd = keeper.get_unbonding_delegation(&ctx, &delegator, &validator).unwrap();
    assert_eq!(ubd.entries[0].balance, power_tokens(2));
    assert_eq!(keeper.get_validator(&ctx, &validator).unwrap().tokens, power_tokens(5));
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), power_tokens(2));

    end_blocker(&mut ctx, &keeper);
    assert_eq!(bank.balance(&ctx, &delegator, "stake"), power_tokens(2));
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_slash_unbonds_redelegated_shares_from_bonded_destination() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let src = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let dst = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(10));
    end_blocker(&mut ctx, &keeper);
    assert_eq!(status(&ctx, &keeper, &dst), BondStatus::Bonded);

    testing::next_block(&mut ctx, BLOCK);
    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, src, power_tokens(4));
    testing::next_block(&mut ctx, BLOCK);
    redelegate(&mut ctx, &keeper, delegator, src, dst, power_tokens(4)).unwrap();

    let red = keeper.get_redelegation(&ctx, &delegator, &src, &dst).unwrap();
    assert_eq!(red.entries[0].creation_height, 3);
    assert_eq!(red.entries[0].initial_balance, power_tokens(4));
    assert_eq!(red.entries[0].shares_dst, Dec::from_int(power_tokens(4)));
    assert_eq!(keeper.bonded_pool_balance(&ctx), power_tokens(24));
    let supply = bank.supply(&ctx, "stake");

    testing::next_block(&mut ctx, BLOCK);
    keeper.slash(&mut ctx, &pubkey(1).address(), 3, 14, &Dec::new_with_prec(5, 1));

    // half the destination shares are unbonded and burned from the bonded pool
    let delegation = keeper.get_delegation(&ctx, &delegator, &dst).unwrap();
    assert_eq!(delegation.shares, Dec::from_int(power_tokens(2)));
    assert_eq!(keeper.get_validator(&ctx, &dst).unwrap().tokens, power_tokens(12));
    // the remaining 5 of the 7 power owed comes from the source
    assert_eq!(keeper.get_validator(&ctx, &src).unwrap().tokens, power_tokens(5));
    assert_eq!(keeper.bonded_pool_balance(&ctx), power_tokens(17));
    assert_eq!(keeper.not_bonded_pool_balance(&ctx), 0);
    assert_eq!(bank.supply(&ctx, "stake"), supply - power_tokens(7));
    assert_eq!(all_invariants(&ctx, &keeper), Ok(()));
}

#[test]
fn test_redelegation_to_worthless_destination_leaves_source_intact() {
    let (keeper, bank) = testing::keeper();
    let mut store = MemStore::new();
    let mut ctx = Context::new(&mut store, testing::header(1, GENESIS_TIME));

    let src = testing::create_validator(&mut ctx, &keeper, &bank, 1, power_tokens(10));
    let dst = testing::create_validator(&mut ctx, &keeper, &bank, 2, power_tokens(10));
    end_blocker(&mut ctx, &keeper);

    let delegator = addr(9);
    testing::delegate(&mut ctx, &keeper, &bank, delegator, src, power_tokens(4));
    keeper.slash(&mut ctx, &pubkey(2).address(), 1, 10, &Dec::one());
    assert!(keeper.get_validator(&ctx, &dst).unwrap().invalid_ex_rate());

    let shares = Dec::from_int(power_tokens(4));
    assert!(matches!(
        keeper.begin_redelegation(&mut ctx, &delegator, &src, &dst, &shares),
        Err(StakingError::DelegatorShareExRateInvalid)
    ));
    assert_eq!(keeper.get_delegation(&ctx, &delegator, &src).unwrap().shares, shares);
    assert_eq!(keeper.get_validator(&ctx, &src).unwrap().tokens, power_tokens(14));
    assert!(keeper.get_redelegation(&ctx, &delegator, &src, &dst).is_none());
}
