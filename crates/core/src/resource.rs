// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource value type and producer hash.
//!
//! A resource is one immutable typed value emitted by a producer, tagged
//! with the identity hash of the producer that created it.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content-derived identity of a producer.
///
/// Never empty; values from [`ProducerIdentity`](crate::ProducerIdentity)
/// are 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProducerHash(String);

impl ProducerHash {
    /// Create a hash from a precomputed value. Empty or whitespace-only
    /// input is a configuration error.
    pub fn new(hash: impl Into<String>) -> Result<Self, CoreError> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(CoreError::EmptyProducerHash);
        }
        Ok(Self(hash))
    }

    pub(crate) fn from_digest(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProducerHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One value pulled from a producer.
///
/// Created fresh on every producer tick, never mutated afterwards, and
/// never persisted.
#[derive(Debug, Clone)]
pub struct Resource<T> {
    producer_hash: ProducerHash,
    name: String,
    value: T,
}

impl<T> Resource<T> {
    pub fn new(producer_hash: ProducerHash, name: impl Into<String>, value: T) -> Self {
        Self {
            producer_hash,
            name: name.into(),
            value,
        }
    }

    /// Identity hash of the producer that emitted this resource.
    pub fn producer_hash(&self) -> &ProducerHash {
        &self.producer_hash
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Equality is over the payload value only. Two resources with equal
/// values are equal regardless of provenance.
impl<T: PartialEq> PartialEq for Resource<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Resource<T> {}

impl<T: fmt::Display> fmt::Display for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {} Value: {}", self.name, self.value)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
