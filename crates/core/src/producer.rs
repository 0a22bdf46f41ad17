// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Producer contract and identity hashing.
//!
//! A producer is a named unit that yields one typed resource per
//! schedule tick. Its identity is the triple (concrete type name,
//! producer name, serialized settings); the SHA-256 of that triple keys
//! resource streams.

use crate::cron::CronSchedule;
use crate::error::{BoxError, CoreError};
use crate::resource::{ProducerHash, Resource};
use crate::serialize::Serializer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::OnceLock;

/// A named source of typed resources, pulled on a cron schedule.
///
/// Synchronous producers satisfy the contract by returning an
/// already-resolved future from `pull`.
#[async_trait]
pub trait ResourceProducer<T>: Send + Sync {
    /// Unique name within this producer's resource type.
    fn name(&self) -> &str;

    /// Content-derived identity hash (see [`ProducerIdentity`]).
    fn hash(&self) -> &ProducerHash;

    /// Schedule driving this producer's ticks.
    fn schedule(&self) -> &CronSchedule;

    /// Yield the next resource. Called once per schedule tick.
    async fn pull(&self) -> Result<Resource<T>, BoxError>;
}

/// Identity triple of a producer plus its lazily computed hash.
///
/// Concrete producers embed one of these rather than inheriting from a
/// base type; the trait methods delegate to it.
pub struct ProducerIdentity<S> {
    type_name: &'static str,
    name: String,
    settings: S,
    serialized_settings: String,
    hash: OnceLock<ProducerHash>,
}

impl<S: Serialize> ProducerIdentity<S> {
    /// Build an identity for a producer of concrete type named by
    /// `type_name` (pass `std::any::type_name::<Self>()`).
    ///
    /// Settings are serialized here, once; later mutation of the settings
    /// object cannot change the identity.
    pub fn new<Z: Serializer>(
        type_name: &'static str,
        name: impl Into<String>,
        settings: S,
        serializer: &Z,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::EmptyProducerName);
        }
        let serialized_settings = serializer.serialize_to_string(&settings)?;
        Ok(Self {
            type_name,
            name,
            settings,
            serialized_settings,
            hash: OnceLock::new(),
        })
    }
}

impl<S> ProducerIdentity<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn serialized_settings(&self) -> &str {
        &self.serialized_settings
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// SHA-256 over UTF-8 bytes of `type_name + name + serialized
    /// settings`, hex-encoded. Computed once and cached.
    pub fn hash(&self) -> &ProducerHash {
        self.hash.get_or_init(|| {
            let digest = Sha256::digest(self.hash_bytes());
            ProducerHash::from_digest(format!("{:x}", digest))
        })
    }

    fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            self.type_name.len() + self.name.len() + self.serialized_settings.len(),
        );
        bytes.extend_from_slice(self.type_name.as_bytes());
        bytes.extend_from_slice(self.name.as_bytes());
        bytes.extend_from_slice(self.serialized_settings.as_bytes());
        bytes
    }
}

impl<S> fmt::Display for ProducerIdentity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.hash())
    }
}

impl<S: fmt::Debug> fmt::Debug for ProducerIdentity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerIdentity")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Baseline settings for cron-driven producers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronProducerSettings {
    pub cron: String,
}

impl CronProducerSettings {
    /// Parse the configured expression. Fails fast on malformed input.
    pub fn schedule(&self) -> Result<CronSchedule, crate::error::CronParseError> {
        CronSchedule::parse(&self.cron)
    }
}

impl Default for CronProducerSettings {
    fn default() -> Self {
        Self {
            cron: "* * * * * *".to_string(),
        }
    }
}

/// Fail fast when a required producer setting is missing.
///
/// Connectors validate their settings at construction with this helper
/// instead of inheriting from a validation base type.
pub fn require_setting(producer: &str, field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingSetting {
            producer: producer.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;
