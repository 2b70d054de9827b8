//! Pool accounts and the bank collaborator
//!
//! Staking custody lives in two module accounts: the bonded pool backs the
//! tokens of bonded validators, the not-bonded pool everything else
//! (unbonding and unbonded validators, pending unbonding delegations).
//! Balances are moved through the `BankKeeper` trait so the engine never
//! touches account storage directly.

use crate::context::{Context, StoreKey};
use crate::types::{Address, Coin};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

pub const BONDED_POOL_NAME: &str = "bonded_tokens_pool";
pub const NOT_BONDED_POOL_NAME: &str = "not_bonded_tokens_pool";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("insufficient funds: {address} has {available}{denom}, needs {needed}{denom}")]
    InsufficientFunds {
        address: Address,
        denom: String,
        needed: u128,
        available: u128,
    },

    #[error("module account {0} does not have burn permissions")]
    BurnNotPermitted(String),

    #[error("balance overflow for {0}")]
    Overflow(Address),
}

/// Account-side operations consumed by staking
pub trait BankKeeper {
    fn balance(&self, ctx: &Context<'_>, address: &Address, denom: &str) -> u128;

    fn module_address(&self, module: &str) -> Address {
        Address::for_module(module)
    }

    fn send_coins_from_module_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &str,
        to: &str,
        coin: &Coin,
    ) -> Result<(), BankError>;

    /// Move an account's coins into a module's custody for bonding
    fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        module: &str,
        coin: &Coin,
    ) -> Result<(), BankError>;

    /// Return coins from a module's custody to an account
    fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        recipient: &Address,
        coin: &Coin,
    ) -> Result<(), BankError>;

    fn burn_coins(&self, ctx: &mut Context<'_>, module: &str, coin: &Coin) -> Result<(), BankError>;
}

const BALANCE_PREFIX: u8 = 0x01;
const SUPPLY_PREFIX: u8 = 0x02;

/// Minimal bank over the context store, tracking balances and total supply
#[derive(Clone, Debug)]
pub struct BaseBank {
    store_key: StoreKey,
    burners: BTreeSet<&'static str>,
}

impl Default for BaseBank {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseBank {
    pub const STORE_KEY: StoreKey = StoreKey::new("bank");

    /// Bank with both staking pools allowed to burn
    pub fn new() -> Self {
        Self {
            store_key: Self::STORE_KEY,
            burners: [BONDED_POOL_NAME, NOT_BONDED_POOL_NAME].into_iter().collect(),
        }
    }

    pub fn with_burner(mut self, module: &'static str) -> Self {
        self.burners.insert(module);
        self
    }

    fn balance_key(address: &Address, denom: &str) -> Vec<u8> {
        let mut key = vec![BALANCE_PREFIX];
        key.extend_from_slice(address.as_bytes());
        key.extend_from_slice(denom.as_bytes());
        key
    }

    fn supply_key(denom: &str) -> Vec<u8> {
        let mut key = vec![SUPPLY_PREFIX];
        key.extend_from_slice(denom.as_bytes());
        key
    }

    fn read_amount(&self, ctx: &Context<'_>, key: &[u8]) -> u128 {
        ctx.get(self.store_key, key)
            .map(|bytes| {
                let array: [u8; 16] = bytes
                    .as_slice()
                    .try_into()
                    .unwrap_or_else(|_| panic!("corrupted bank amount under {}", hex::encode(key)));
                u128::from_be_bytes(array)
            })
            .unwrap_or(0)
    }

    fn write_amount(&self, ctx: &mut Context<'_>, key: &[u8], amount: u128) {
        if amount == 0 {
            ctx.delete(self.store_key, key);
        } else {
            ctx.set(self.store_key, key, amount.to_be_bytes().to_vec());
        }
    }

    fn set_balance(&self, ctx: &mut Context<'_>, address: &Address, denom: &str, amount: u128) {
        self.write_amount(ctx, &Self::balance_key(address, denom), amount);
    }

    pub fn supply(&self, ctx: &Context<'_>, denom: &str) -> u128 {
        self.read_amount(ctx, &Self::supply_key(denom))
    }

    fn sub_balance(&self, ctx: &mut Context<'_>, address: &Address, coin: &Coin) -> Result<(), BankError> {
        let available = self.balance(ctx, address, &coin.denom);
        if available < coin.amount {
            return Err(BankError::InsufficientFunds {
                address: *address,
                denom: coin.denom.clone(),
                needed: coin.amount,
                available,
            });
        }
        self.set_balance(ctx, address, &coin.denom, available - coin.amount);
        Ok(())
    }

    fn add_balance(&self, ctx: &mut Context<'_>, address: &Address, coin: &Coin) -> Result<(), BankError> {
        let current = self.balance(ctx, address, &coin.denom);
        let updated = current
            .checked_add(coin.amount)
            .ok_or(BankError::Overflow(*address))?;
        self.set_balance(ctx, address, &coin.denom, updated);
        Ok(())
    }

    pub fn send_coins(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), BankError> {
        self.sub_balance(ctx, from, coin)?;
        self.add_balance(ctx, to, coin)
    }

    /// Create new coins in an account, growing total supply
    pub fn mint_coins_to(&self, ctx: &mut Context<'_>, address: &Address, coin: &Coin) -> Result<(), BankError> {
        self.add_balance(ctx, address, coin)?;
        let supply = self.supply(ctx, &coin.denom);
        self.write_amount(ctx, &Self::supply_key(&coin.denom), supply + coin.amount);
        Ok(())
    }

    pub fn mint_coins(&self, ctx: &mut Context<'_>, module: &str, coin: &Coin) -> Result<(), BankError> {
        let address = self.module_address(module);
        self.mint_coins_to(ctx, &address, coin)
    }
}

impl BankKeeper for BaseBank {
    fn balance(&self, ctx: &Context<'_>, address: &Address, denom: &str) -> u128 {
        self.read_amount(ctx, &Self::balance_key(address, denom))
    }

    fn send_coins_from_module_to_module(
        &self,
        ctx: &mut Context<'_>,
        from: &str,
        to: &str,
        coin: &Coin,
    ) -> Result<(), BankError> {
        let from = self.module_address(from);
        let to = self.module_address(to);
        self.send_coins(ctx, &from, &to, coin)
    }

    fn delegate_coins_from_account_to_module(
        &self,
        ctx: &mut Context<'_>,
        delegator: &Address,
        module: &str,
        coin: &Coin,
    ) -> Result<(), BankError> {
        let module = self.module_address(module);
        self.send_coins(ctx, delegator, &module, coin)
    }

    fn undelegate_coins_from_module_to_account(
        &self,
        ctx: &mut Context<'_>,
        module: &str,
        recipient: &Address,
        coin: &Coin,
    ) -> Result<(), BankError> {
        let module = self.module_address(module);
        self.send_coins(ctx, &module, recipient, coin)
    }

    fn burn_coins(&self, ctx: &mut Context<'_>, module: &str, coin: &Coin) -> Result<(), BankError> {
        if !self.burners.contains(module) {
            return Err(BankError::BurnNotPermitted(module.to_string()));
        }
        let address = self.module_address(module);
        self.sub_balance(ctx, &address, coin)?;
        let supply = self.supply(ctx, &coin.denom);
        self.write_amount(ctx, &Self::supply_key(&coin.denom), supply.saturating_sub(coin.amount));
        debug!(module, amount = coin.amount, denom = %coin.denom, "burned coins");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BlockHeader;
    use crate::store::MemStore;
    use crate::types::Timestamp;

    fn header() -> BlockHeader {
        BlockHeader {
            chain_id: "bank".into(),
            height: 1,
            time: Timestamp::ZERO,
        }
    }

    #[test]
    fn test_delegate_and_burn() {
        let bank = BaseBank::new();
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, header());
        let alice = Address([1; 20]);

        bank.mint_coins_to(&mut ctx, &alice, &Coin::new("stake", 100)).unwrap();
        bank.delegate_coins_from_account_to_module(&mut ctx, &alice, BONDED_POOL_NAME, &Coin::new("stake", 60))
            .unwrap();
        bank.send_coins_from_module_to_module(&mut ctx, BONDED_POOL_NAME, NOT_BONDED_POOL_NAME, &Coin::new("stake", 10))
            .unwrap();
        bank.burn_coins(&mut ctx, NOT_BONDED_POOL_NAME, &Coin::new("stake", 4)).unwrap();

        let bonded = bank.module_address(BONDED_POOL_NAME);
        let not_bonded = bank.module_address(NOT_BONDED_POOL_NAME);
        assert_eq!(bank.balance(&ctx, &alice, "stake"), 40);
        assert_eq!(bank.balance(&ctx, &bonded, "stake"), 50);
        assert_eq!(bank.balance(&ctx, &not_bonded, "stake"), 6);
        assert_eq!(bank.supply(&ctx, "stake"), 96);
    }

    #[test]
    fn test_insufficient_funds() {
        let bank = BaseBank::new();
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, header());
        let alice = Address([1; 20]);
        let err = bank
            .delegate_coins_from_account_to_module(&mut ctx, &alice, BONDED_POOL_NAME, &Coin::new("stake", 1))
            .unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { needed: 1, available: 0, .. }));
    }

    #[test]
    fn test_burn_requires_permission() {
        let bank = BaseBank::new();
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, header());
        bank.mint_coins(&mut ctx, "distribution", &Coin::new("stake", 5)).unwrap();
        assert_eq!(
            bank.burn_coins(&mut ctx, "distribution", &Coin::new("stake", 1)),
            Err(BankError::BurnNotPermitted("distribution".into()))
        );
        let bank = bank.with_burner("distribution");
        assert!(bank.burn_coins(&mut ctx, "distribution", &Coin::new("stake", 1)).is_ok());
    }
}
