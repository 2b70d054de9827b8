//! Test fixtures shared with downstream crates (feature `testing`)

use crate::bank::BaseBank;
use crate::context::{BlockHeader, Context};
use crate::handler::{handle_msg, MsgResponse};
use crate::hooks::StakingHooks;
use crate::keeper::Keeper;
use crate::math::{tokens_from_consensus_power, Dec};
use crate::msg::{MsgCreateValidator, MsgDelegate, StakingMsg};
use crate::params::DEFAULT_BOND_DENOM;
use crate::types::{Address, Coin, ConsAddress, ConsPubKey, Height, Timestamp};
use crate::validator::{CommissionRates, Description, Validator};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub const TEST_CHAIN_ID: &str = "zeratul-test";

/// Hook call observed by `RecordingHooks`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookEvent {
    AfterValidatorCreated(Address),
    BeforeValidatorModified(Address),
    AfterValidatorRemoved(ConsAddress, Address),
    AfterValidatorBonded(ConsAddress, Address),
    AfterValidatorBeginUnbonding(ConsAddress, Address),
    BeforeDelegationCreated(Address, Address),
    BeforeDelegationSharesModified(Address, Address),
    BeforeDelegationRemoved(Address, Address),
    AfterDelegationModified(Address, Address),
    BeforeValidatorSlashed(Address, Dec),
}

/// Hooks that record every call. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingHooks {
    events: Rc<RefCell<Vec<HookEvent>>>,
}

impl RecordingHooks {
    pub fn events(&self) -> Vec<HookEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: HookEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl StakingHooks for RecordingHooks {
    fn after_validator_created(&self, _ctx: &mut Context<'_>, validator: &Validator) {
        self.record(HookEvent::AfterValidatorCreated(validator.operator));
    }

    fn before_validator_modified(&self, _ctx: &mut Context<'_>, operator: &Address) {
        self.record(HookEvent::BeforeValidatorModified(*operator));
    }

    fn after_validator_removed(&self, _ctx: &mut Context<'_>, cons_addr: &ConsAddress, operator: &Address) {
        self.record(HookEvent::AfterValidatorRemoved(*cons_addr, *operator));
    }

    fn after_validator_bonded(&self, _ctx: &mut Context<'_>, cons_addr: &ConsAddress, operator: &Address) {
        self.record(HookEvent::AfterValidatorBonded(*cons_addr, *operator));
    }

    fn after_validator_begin_unbonding(&self, _ctx: &mut Context<'_>, cons_addr: &ConsAddress, operator: &Address) {
        self.record(HookEvent::AfterValidatorBeginUnbonding(*cons_addr, *operator));
    }

    fn before_delegation_created(&self, _ctx: &mut Context<'_>, delegator: &Address, validator: &Address) {
        self.record(HookEvent::BeforeDelegationCreated(*delegator, *validator));
    }

    fn before_delegation_shares_modified(&self, _ctx: &mut Context<'_>, delegator: &Address, validator: &Address) {
        self.record(HookEvent::BeforeDelegationSharesModified(*delegator, *validator));
    }

    fn before_delegation_removed(&self, _ctx: &mut Context<'_>, delegator: &Address, validator: &Address) {
        self.record(HookEvent::BeforeDelegationRemoved(*delegator, *validator));
    }

    fn after_delegation_modified(&self, _ctx: &mut Context<'_>, delegator: &Address, validator: &Address) {
        self.record(HookEvent::AfterDelegationModified(*delegator, *validator));
    }

    fn before_validator_slashed(&self, _ctx: &mut Context<'_>, operator: &Address, fraction: &Dec) {
        self.record(HookEvent::BeforeValidatorSlashed(*operator, fraction.clone()));
    }
}

pub fn header(height: Height, time: Timestamp) -> BlockHeader {
    BlockHeader {
        chain_id: TEST_CHAIN_ID.into(),
        height,
        time,
    }
}

pub fn addr(n: u8) -> Address {
    Address([n; 20])
}

pub fn pubkey(n: u8) -> ConsPubKey {
    ConsPubKey::Ed25519([n; 32])
}

/// Tokens worth `power` units of consensus power
pub fn power_tokens(power: i64) -> u128 {
    tokens_from_consensus_power(power)
}

pub fn stake(amount: u128) -> Coin {
    Coin::new(DEFAULT_BOND_DENOM, amount)
}

/// Keeper over a fresh `BaseBank`. Balances live in the context store, so
/// the returned copy sees every transfer the keeper makes.
pub fn keeper() -> (Keeper, BaseBank) {
    let bank = BaseBank::new();
    (Keeper::with_bincode(Box::new(bank.clone())), bank)
}

pub fn keeper_with_hooks() -> (Keeper, BaseBank, RecordingHooks) {
    let (mut keeper, bank) = keeper();
    let hooks = RecordingHooks::default();
    keeper.set_hooks(Box::new(hooks.clone()));
    (keeper, bank, hooks)
}

pub fn fund(ctx: &mut Context<'_>, bank: &BaseBank, account: &Address, amount: u128) {
    bank.mint_coins_to(ctx, account, &stake(amount))
        .expect("minting test funds");
}

pub fn create_validator_msg(n: u8, amount: u128) -> MsgCreateValidator {
    MsgCreateValidator {
        description: Description::new(format!("validator-{}", n)),
        commission: CommissionRates::new(
            Dec::new_with_prec(1, 1),
            Dec::new_with_prec(2, 1),
            Dec::new_with_prec(1, 2),
        ),
        min_self_delegation: 1,
        delegator_address: addr(n),
        validator_address: addr(n),
        pubkey: pubkey(n),
        value: stake(amount),
    }
}

/// Fund operator `n` and create its validator with `amount` self-delegated
pub fn create_validator(ctx: &mut Context<'_>, keeper: &Keeper, bank: &BaseBank, n: u8, amount: u128) -> Address {
    fund(ctx, bank, &addr(n), amount);
    let msg = StakingMsg::CreateValidator(create_validator_msg(n, amount));
    assert_eq!(handle_msg(ctx, keeper, &msg).expect("creating test validator"), MsgResponse::Empty);
    addr(n)
}

/// Fund `delegator` and delegate `amount` to `validator`
pub fn delegate(ctx: &mut Context<'_>, keeper: &Keeper, bank: &BaseBank, delegator: Address, validator: Address, amount: u128) {
    fund(ctx, bank, &delegator, amount);
    let msg = StakingMsg::Delegate(MsgDelegate {
        delegator_address: delegator,
        validator_address: validator,
        amount: stake(amount),
    });
    handle_msg(ctx, keeper, &msg).expect("test delegation");
}

/// Advance to the next block, `elapsed` later
pub fn next_block(ctx: &mut Context<'_>, elapsed: Duration) {
    let height = ctx.block_height() + 1;
    let time = ctx.block_time().saturating_add(elapsed);
    ctx.set_header(header(height, time));
}
