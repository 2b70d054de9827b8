//! Fixed-point decimals for shares, rates and fractions
//!
//! ## Representation
//!
//! A `Dec` is an arbitrary-precision integer scaled by 10^18. Share and
//! token conversions multiply before they divide, so the intermediate value
//! can be far wider than any machine integer; `num-bigint` keeps it exact.
//!
//! ## Rounding
//!
//! ```text
//! mul, quo         banker's rounding (half to even) at the 18th digit
//! mul_truncate     toward zero
//! quo_truncate     toward zero
//! quo_round_up     away from zero for positive operands
//! truncate_int     drop the fractional part
//! ```
//!
//! Every node must round identically, so there is no floating point here.

use num_bigint::{BigInt, Sign};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// Number of decimal places carried by `Dec`
pub const PRECISION: u32 = 18;

/// Tokens per unit of consensus power
pub const POWER_REDUCTION: u128 = 1_000_000;

fn precision_multiplier() -> BigInt {
    BigInt::from(10u64.pow(PRECISION))
}

/// Signed fixed-point decimal with 18 digits of precision
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(BigInt);

impl Dec {
    pub fn zero() -> Self {
        Dec(BigInt::from(0))
    }

    pub fn one() -> Self {
        Dec(precision_multiplier())
    }

    /// Whole-number decimal
    pub fn from_int(value: u128) -> Self {
        Dec(BigInt::from(value) * precision_multiplier())
    }

    pub fn from_i64(value: i64) -> Self {
        Dec(BigInt::from(value) * precision_multiplier())
    }

    /// `new_with_prec(5, 1)` is 0.5, `new_with_prec(1, 2)` is 0.01
    pub fn new_with_prec(value: i64, prec: u32) -> Self {
        assert!(
            prec <= PRECISION,
            "precision {} exceeds maximum {}",
            prec,
            PRECISION
        );
        Dec(BigInt::from(value) * BigInt::from(10u64).pow(PRECISION - prec))
    }

    pub fn is_zero(&self) -> bool {
        self.0.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    pub fn is_positive(&self) -> bool {
        self.0.sign() == Sign::Plus
    }

    pub fn abs(&self) -> Dec {
        if self.is_negative() {
            -self.clone()
        } else {
            self.clone()
        }
    }

    /// Product, rounded half to even
    pub fn mul(&self, other: &Dec) -> Dec {
        Dec(chop_precision_and_round(&self.0 * &other.0))
    }

    /// Product, truncated toward zero
    pub fn mul_truncate(&self, other: &Dec) -> Dec {
        Dec((&self.0 * &other.0) / precision_multiplier())
    }

    /// Exact product with an integer
    pub fn mul_int(&self, value: u128) -> Dec {
        Dec(&self.0 * BigInt::from(value))
    }

    /// Quotient, rounded half to even
    ///
    /// Panics on division by zero.
    pub fn quo(&self, other: &Dec) -> Dec {
        assert!(!other.is_zero(), "decimal division by zero");
        let pm = precision_multiplier();
        let scaled = &self.0 * &pm * &pm;
        Dec(chop_precision_and_round(scaled / &other.0))
    }

    /// Quotient, truncated toward zero
    pub fn quo_truncate(&self, other: &Dec) -> Dec {
        assert!(!other.is_zero(), "decimal division by zero");
        Dec((&self.0 * precision_multiplier()) / &other.0)
    }

    /// Quotient, rounded up when there is a positive remainder
    pub fn quo_round_up(&self, other: &Dec) -> Dec {
        assert!(!other.is_zero(), "decimal division by zero");
        let scaled = &self.0 * precision_multiplier();
        let quo = &scaled / &other.0;
        let rem = &scaled % &other.0;
        if rem.sign() != Sign::NoSign && (rem.sign() == other.0.sign()) {
            Dec(quo + BigInt::from(1))
        } else {
            Dec(quo)
        }
    }

    /// Quotient by an integer, truncated toward zero
    pub fn quo_int(&self, value: u128) -> Dec {
        assert!(value != 0, "decimal division by zero");
        Dec(&self.0 / BigInt::from(value))
    }

    /// Integer part as a token amount
    ///
    /// Panics on negative values: token amounts can never go below zero,
    /// so reaching this is a broken invariant upstream.
    pub fn truncate_int(&self) -> u128 {
        let int = &self.0 / precision_multiplier();
        u128::try_from(&int)
            .unwrap_or_else(|_| panic!("decimal {} is not a valid token amount", self))
    }

    /// Nearest `i64`, half to even
    pub fn round_int64(&self) -> i64 {
        let rounded = chop_precision_and_round(self.0.clone());
        i64::try_from(&rounded).unwrap_or_else(|_| panic!("decimal {} overflows i64", self))
    }
}

fn chop_precision_and_round(value: BigInt) -> BigInt {
    if value.sign() == Sign::Minus {
        return -chop_precision_and_round(-value);
    }

    let pm = precision_multiplier();
    let quo = &value / &pm;
    let rem = &value % &pm;
    if rem.sign() == Sign::NoSign {
        return quo;
    }

    let half = &pm / BigInt::from(2);
    match rem.cmp(&half) {
        Ordering::Less => quo,
        Ordering::Greater => quo + BigInt::from(1),
        Ordering::Equal => {
            if (&quo % BigInt::from(2)).sign() == Sign::NoSign {
                quo
            } else {
                quo + BigInt::from(1)
            }
        }
    }
}

impl Default for Dec {
    fn default() -> Self {
        Dec::zero()
    }
}

impl Add for Dec {
    type Output = Dec;

    fn add(self, rhs: Dec) -> Dec {
        Dec(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Dec> for &'a Dec {
    type Output = Dec;

    fn add(self, rhs: &'a Dec) -> Dec {
        Dec(&self.0 + &rhs.0)
    }
}

impl Sub for Dec {
    type Output = Dec;

    fn sub(self, rhs: Dec) -> Dec {
        Dec(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a Dec> for &'a Dec {
    type Output = Dec;

    fn sub(self, rhs: &'a Dec) -> Dec {
        Dec(&self.0 - &rhs.0)
    }
}

impl Neg for Dec {
    type Output = Dec;

    fn neg(self) -> Dec {
        Dec(-self.0)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.magnitude().to_string();
        let precision = PRECISION as usize;
        let (int_part, frac_part) = if digits.len() > precision {
            let split = digits.len() - precision;
            (digits[..split].to_string(), digits[split..].to_string())
        } else {
            ("0".to_string(), format!("{:0>width$}", digits, width = precision))
        };
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({})", self)
    }
}

/// Errors from parsing decimal strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecError {
    #[error("empty decimal string")]
    Empty,

    #[error("invalid decimal string: {0}")]
    InvalidFormat(String),

    #[error("too many decimal places: {got} > {max}")]
    TooPrecise { got: usize, max: usize },
}

impl FromStr for Dec {
    type Err = DecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DecError::Empty);
        }

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let mut parts = body.split('.');
        let int_part = parts.next().unwrap_or_default();
        let frac_part = parts.next().unwrap_or_default();
        if parts.next().is_some() || (int_part.is_empty() && frac_part.is_empty()) {
            return Err(DecError::InvalidFormat(s.to_string()));
        }

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(DecError::InvalidFormat(s.to_string()));
        }

        if frac_part.len() > PRECISION as usize {
            return Err(DecError::TooPrecise {
                got: frac_part.len(),
                max: PRECISION as usize,
            });
        }

        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let combined = format!(
            "{}{:0<width$}",
            int_part,
            frac_part,
            width = PRECISION as usize
        );
        let value = BigInt::parse_bytes(combined.as_bytes(), 10)
            .ok_or_else(|| DecError::InvalidFormat(s.to_string()))?;

        Ok(Dec(if negative { -value } else { value }))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Consensus power backed by `tokens`
pub fn tokens_to_consensus_power(tokens: u128) -> i64 {
    i64::try_from(tokens / POWER_REDUCTION).unwrap_or(i64::MAX)
}

/// Tokens represented by `power` units of consensus power
pub fn tokens_from_consensus_power(power: i64) -> u128 {
    u128::try_from(power).unwrap_or(0) * POWER_REDUCTION
}
