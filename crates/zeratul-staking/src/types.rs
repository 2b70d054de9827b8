//! Identifiers and primitive value types shared by the staking and slashing modules

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Block height
pub type Height = i64;

/// Length of account and consensus addresses
pub const ADDRESS_LEN: usize = 20;

fn truncated_sha256(data: &[u8]) -> [u8; ADDRESS_LEN] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; ADDRESS_LEN];
    out.copy_from_slice(&digest[..ADDRESS_LEN]);
    out
}

macro_rules! address_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub [u8; ADDRESS_LEN]);

        impl $name {
            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                let array: [u8; ADDRESS_LEN] = bytes.try_into().ok()?;
                Some(Self(array))
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0 == [0u8; ADDRESS_LEN]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }
    };
}

address_type!(
    Address,
    "Account address. Validator operators are ordinary accounts."
);
address_type!(
    ConsAddress,
    "Consensus address, derived from a validator's consensus public key"
);

impl Address {
    /// Address of a module-owned account
    pub fn for_module(name: &str) -> Self {
        Address(truncated_sha256(name.as_bytes()))
    }
}

/// Consensus key algorithms
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PubKeyType {
    Ed25519,
    Secp256k1,
}

impl PubKeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PubKeyType::Ed25519 => "ed25519",
            PubKeyType::Secp256k1 => "secp256k1",
        }
    }
}

impl fmt::Display for PubKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consensus public key of a validator
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsPubKey {
    Ed25519([u8; 32]),
    Secp256k1(#[serde(with = "BigArray")] [u8; 33]),
}

impl ConsPubKey {
    pub fn key_type(&self) -> PubKeyType {
        match self {
            ConsPubKey::Ed25519(_) => PubKeyType::Ed25519,
            ConsPubKey::Secp256k1(_) => PubKeyType::Secp256k1,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ConsPubKey::Ed25519(bytes) => bytes,
            ConsPubKey::Secp256k1(bytes) => bytes,
        }
    }

    /// Consensus address: first 20 bytes of sha256 over the raw key
    pub fn address(&self) -> ConsAddress {
        ConsAddress(truncated_sha256(self.as_bytes()))
    }
}

impl fmt::Debug for ConsPubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key_type(), hex::encode(self.as_bytes()))
    }
}

/// Block time, milliseconds since the unix epoch
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(millis))
    }

    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Big-endian bytes, so byte order matches time order in store keys
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Timestamp(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// An amount of a single denomination
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
