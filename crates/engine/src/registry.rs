// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Producer registry.
//!
//! Keyed by (name, resource type) so consumers retrieve a producer's
//! stream without a generic service locator. Name comparison is ordinal
//! byte equality, never locale-sensitive. Duplicate registrations are a
//! configuration error raised when the registry is built, not at lookup
//! time.

use crate::error::RegistryError;
use crate::stream::ResourceStream;
use curator_core::{Clock, ResourceProducer};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder collecting producer registrations.
pub struct ProducerRegistryBuilder {
    clock: Arc<dyn Clock>,
    entries: Vec<Entry>,
}

struct Entry {
    name: String,
    resource_type: TypeId,
    type_label: &'static str,
    stream: Box<dyn Any + Send + Sync>,
}

impl ProducerRegistryBuilder {
    /// Streams created by this registry tick on `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Vec::new(),
        }
    }

    /// Register a producer of resources of type `T` under its own name.
    /// The producer is wrapped in a shared stream once, here.
    pub fn register<T: Clone + Send + Sync + 'static>(
        mut self,
        producer: Arc<dyn ResourceProducer<T>>,
    ) -> Self {
        let name = producer.name().to_string();
        let stream = ResourceStream::new(producer, Arc::clone(&self.clock));
        self.entries.push(Entry {
            name,
            resource_type: TypeId::of::<T>(),
            type_label: std::any::type_name::<T>(),
            stream: Box::new(stream),
        });
        self
    }

    pub fn build(self) -> Result<ProducerRegistry, RegistryError> {
        let mut streams = HashMap::new();
        for entry in self.entries {
            let key = (entry.name.clone(), entry.resource_type);
            if streams.contains_key(&key) {
                return Err(RegistryError::DuplicateRegistration {
                    name: entry.name,
                    resource_type: entry.type_label,
                });
            }
            streams.insert(key, entry.stream);
        }
        Ok(ProducerRegistry { streams })
    }
}

/// Name + resource-type keyed lookup of registered producers and their
/// shared streams.
pub struct ProducerRegistry {
    streams: HashMap<(String, TypeId), Box<dyn Any + Send + Sync>>,
}

impl ProducerRegistry {
    pub fn builder(clock: Arc<dyn Clock>) -> ProducerRegistryBuilder {
        ProducerRegistryBuilder::new(clock)
    }

    /// The shared stream for the named producer. Every call returns a
    /// handle to the same hot stream; resources are never re-pulled
    /// per consumer.
    pub fn stream<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<ResourceStream<T>, RegistryError> {
        self.streams
            .get(&(name.to_string(), TypeId::of::<T>()))
            .and_then(|stream| stream.downcast_ref::<ResourceStream<T>>())
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
                resource_type: std::any::type_name::<T>(),
            })
    }

    /// The registered producer itself. Same instance on repeated calls.
    pub fn producer<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<dyn ResourceProducer<T>>, RegistryError> {
        self.stream::<T>(name).map(|stream| stream.producer())
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
