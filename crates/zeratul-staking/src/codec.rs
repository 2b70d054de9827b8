//! Value encoding for persisted records
//!
//! Keepers receive their codec at construction. Nothing is registered
//! globally, so two keepers with different encodings can share a process.

use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

/// Encoding strategy for store values
pub trait Codec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;

    /// Encode a record the module itself produced
    ///
    /// Failure means the type cannot be represented at all, which no input
    /// can cause, so it panics.
    fn must_encode<T: Serialize>(&self, value: &T) -> Vec<u8> {
        self.encode(value)
            .unwrap_or_else(|e| panic!("store value encoding failed: {}", e))
    }

    /// Decode a record read back from the module store
    ///
    /// Panics on corrupted state.
    fn must_decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> T {
        self.decode(bytes)
            .unwrap_or_else(|e| panic!("corrupted store value: {}", e))
    }
}

/// bincode 1.x with its default (little-endian, fixed-int) options
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
