// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings serializer boundary.
//!
//! Producer settings are serialized once at construction and the result
//! feeds the identity hash, so a serializer must be deterministic: equal
//! logical content must produce identical bytes. The JSON implementation
//! here is the default; other formats are external collaborators.

use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes settings objects to bytes and back.
pub trait Serializer: Send + Sync {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CoreError>;

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CoreError>;

    /// Serialize to a UTF-8 string.
    fn serialize_to_string<T: Serialize>(&self, value: &T) -> Result<String, CoreError> {
        let bytes = self.serialize(value)?;
        String::from_utf8(bytes).map_err(|err| CoreError::Serialize(Box::new(err)))
    }
}

/// Default serializer over `serde_json`.
///
/// Deterministic for equal logical content: struct field order is fixed
/// by the type definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(value).map_err(|err| CoreError::Serialize(Box::new(err)))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CoreError> {
        serde_json::from_slice(bytes).map_err(|err| CoreError::Serialize(Box::new(err)))
    }
}

#[cfg(test)]
#[path = "serialize_tests.rs"]
mod tests;
