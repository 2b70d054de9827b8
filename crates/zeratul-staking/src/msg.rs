//! Staking messages
//!
//! The closed set of transactions the module accepts. `validate_basic`
//! performs the stateless checks; everything that needs the store happens
//! in the handler.

use crate::error::{Result, StakingError};
use crate::math::Dec;
use crate::types::{Address, Coin, ConsPubKey};
use crate::validator::{CommissionRates, Description};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateValidator {
    pub description: Description,
    pub commission: CommissionRates,
    pub min_self_delegation: u128,
    pub delegator_address: Address,
    pub validator_address: Address,
    pub pubkey: ConsPubKey,
    /// Initial self-delegation
    pub value: Coin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEditValidator {
    pub description: Description,
    pub validator_address: Address,
    pub commission_rate: Option<Dec>,
    pub min_self_delegation: Option<u128>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegate {
    pub delegator_address: Address,
    pub validator_address: Address,
    pub amount: Coin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUndelegate {
    pub delegator_address: Address,
    pub validator_address: Address,
    pub amount: Coin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBeginRedelegate {
    pub delegator_address: Address,
    pub validator_src_address: Address,
    pub validator_dst_address: Address,
    pub amount: Coin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingMsg {
    CreateValidator(MsgCreateValidator),
    EditValidator(MsgEditValidator),
    Delegate(MsgDelegate),
    Undelegate(MsgUndelegate),
    BeginRedelegate(MsgBeginRedelegate),
}

impl StakingMsg {
    pub fn route(&self) -> &'static str {
        "staking"
    }

    pub fn msg_type(&self) -> &'static str {
        match self {
            StakingMsg::CreateValidator(_) => "create_validator",
            StakingMsg::EditValidator(_) => "edit_validator",
            StakingMsg::Delegate(_) => "delegate",
            StakingMsg::Undelegate(_) => "begin_unbonding",
            StakingMsg::BeginRedelegate(_) => "begin_redelegate",
        }
    }

    /// Accounts that must sign the message
    pub fn signers(&self) -> Vec<Address> {
        match self {
            StakingMsg::CreateValidator(msg) => {
                if msg.delegator_address == msg.validator_address {
                    vec![msg.delegator_address]
                } else {
                    vec![msg.delegator_address, msg.validator_address]
                }
            }
            StakingMsg::EditValidator(msg) => vec![msg.validator_address],
            StakingMsg::Delegate(msg) => vec![msg.delegator_address],
            StakingMsg::Undelegate(msg) => vec![msg.delegator_address],
            StakingMsg::BeginRedelegate(msg) => vec![msg.delegator_address],
        }
    }

    pub fn validate_basic(&self) -> Result<()> {
        match self {
            StakingMsg::CreateValidator(msg) => msg.validate_basic(),
            StakingMsg::EditValidator(msg) => msg.validate_basic(),
            StakingMsg::Delegate(msg) => {
                check_addresses(&msg.delegator_address, &msg.validator_address)?;
                check_amount(&msg.amount)
            }
            StakingMsg::Undelegate(msg) => {
                check_addresses(&msg.delegator_address, &msg.validator_address)?;
                check_amount(&msg.amount)
            }
            StakingMsg::BeginRedelegate(msg) => {
                check_addresses(&msg.delegator_address, &msg.validator_src_address)?;
                if msg.validator_dst_address.is_empty() {
                    return Err(StakingError::EmptyValidatorAddr);
                }
                if msg.validator_src_address == msg.validator_dst_address {
                    return Err(StakingError::SelfRedelegation);
                }
                check_amount(&msg.amount)
            }
        }
    }
}

fn check_addresses(delegator: &Address, validator: &Address) -> Result<()> {
    if delegator.is_empty() {
        return Err(StakingError::EmptyDelegatorAddr);
    }
    if validator.is_empty() {
        return Err(StakingError::EmptyValidatorAddr);
    }
    Ok(())
}

fn check_amount(amount: &Coin) -> Result<()> {
    if amount.amount == 0 {
        return Err(StakingError::BadDelegationAmount);
    }
    Ok(())
}

impl MsgCreateValidator {
    pub fn validate_basic(&self) -> Result<()> {
        check_addresses(&self.delegator_address, &self.validator_address)?;
        // validators self-delegate from their own operator account
        if self.delegator_address != self.validator_address {
            return Err(StakingError::BadValidatorAddr);
        }
        check_amount(&self.value)?;
        if self.description == Description::default() {
            return Err(StakingError::EmptyDescription);
        }
        if self.commission == CommissionRates::default() {
            return Err(StakingError::InvalidCommission("empty commission"));
        }
        self.commission.validate()?;
        if self.min_self_delegation == 0 {
            return Err(StakingError::MinSelfDelegationInvalid);
        }
        if self.value.amount < self.min_self_delegation {
            return Err(StakingError::SelfDelegationBelowMinimum);
        }
        Ok(())
    }
}

impl MsgEditValidator {
    pub fn validate_basic(&self) -> Result<()> {
        if self.validator_address.is_empty() {
            return Err(StakingError::EmptyValidatorAddr);
        }
        if self.description.is_unset() && self.commission_rate.is_none() && self.min_self_delegation.is_none() {
            return Err(StakingError::NothingToModify);
        }
        if self.min_self_delegation == Some(0) {
            return Err(StakingError::MinSelfDelegationInvalid);
        }
        if let Some(rate) = &self.commission_rate {
            if rate.is_negative() || *rate > Dec::one() {
                return Err(StakingError::InvalidCommission(
                    "commission rate must be between 0 and 1 (inclusive)",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_msg() -> MsgCreateValidator {
        let operator = Address([1; 20]);
        MsgCreateValidator {
            description: Description::new("alpha"),
            commission: CommissionRates::new(
                Dec::new_with_prec(1, 1),
                Dec::new_with_prec(2, 1),
                Dec::new_with_prec(1, 2),
            ),
            min_self_delegation: 1,
            delegator_address: operator,
            validator_address: operator,
            pubkey: ConsPubKey::Ed25519([1; 32]),
            value: Coin::new("stake", 100),
        }
    }

    #[test]
    fn test_create_validator_validate_basic() {
        assert!(StakingMsg::CreateValidator(create_msg()).validate_basic().is_ok());

        let mut msg = create_msg();
        msg.delegator_address = Address([2; 20]);
        assert!(matches!(msg.validate_basic(), Err(StakingError::BadValidatorAddr)));

        let mut msg = create_msg();
        msg.description = Description::default();
        assert!(matches!(msg.validate_basic(), Err(StakingError::EmptyDescription)));

        let mut msg = create_msg();
        msg.min_self_delegation = 500;
        assert!(matches!(msg.validate_basic(), Err(StakingError::SelfDelegationBelowMinimum)));

        let mut msg = create_msg();
        msg.value.amount = 0;
        assert!(matches!(msg.validate_basic(), Err(StakingError::BadDelegationAmount)));
    }

    #[test]
    fn test_edit_validator_requires_a_change() {
        let msg = MsgEditValidator {
            description: Description {
                moniker: Description::DO_NOT_MODIFY.into(),
                ..Description::default()
            },
            validator_address: Address([1; 20]),
            commission_rate: None,
            min_self_delegation: None,
        };
        assert!(matches!(msg.validate_basic(), Err(StakingError::NothingToModify)));

        let msg = MsgEditValidator {
            commission_rate: Some(Dec::from_int(2)),
            ..msg
        };
        assert!(matches!(msg.validate_basic(), Err(StakingError::InvalidCommission(_))));
    }

    #[test]
    fn test_redelegate_to_same_validator_rejected() {
        let val = Address([5; 20]);
        let msg = StakingMsg::BeginRedelegate(MsgBeginRedelegate {
            delegator_address: Address([1; 20]),
            validator_src_address: val,
            validator_dst_address: val,
            amount: Coin::new("stake", 10),
        });
        assert!(matches!(msg.validate_basic(), Err(StakingError::SelfRedelegation)));
        assert_eq!(msg.msg_type(), "begin_redelegate");
    }
}
