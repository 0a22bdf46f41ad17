// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution contexts and the service accessor.
//!
//! Every chain run gets a fresh context, owned by that run alone and
//! discarded when the chain completes. Tasks pass data forward through
//! the context's item bag.

use curator_core::Resource;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-keyed store of shared dependencies.
///
/// Replaces a DI container: the host registers what tasks need, tasks
/// look it up by type.
#[derive(Default)]
pub struct ServiceMap {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service instance, replacing any previous one of the
    /// same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.services.insert(TypeId::of::<T>(), service);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|service| Arc::clone(service).downcast::<T>().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// String-keyed bag of values tasks use to pass data down the chain.
#[derive(Default)]
pub struct Items {
    entries: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Items {
    pub fn insert<V: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), Box::new(value));
    }

    pub fn get<V: 'static>(&self, key: &str) -> Option<&V> {
        self.entries.get(key).and_then(|value| value.downcast_ref())
    }

    pub fn remove<V: Send + Sync + 'static>(&mut self, key: &str) -> Option<V> {
        self.entries
            .remove(key)
            .and_then(|value| value.downcast::<V>().ok())
            .map(|value| *value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Context for one scheduled pipeline run.
pub struct TaskContext {
    services: Arc<ServiceMap>,
    items: Mutex<Items>,
}

impl TaskContext {
    pub fn new(services: Arc<ServiceMap>) -> Self {
        Self {
            services,
            items: Mutex::new(Items::default()),
        }
    }

    pub fn services(&self) -> &ServiceMap {
        &self.services
    }

    /// Look up a shared dependency by type.
    pub fn service<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services.get::<T>()
    }

    pub fn insert_item<V: Send + Sync + 'static>(&self, key: impl Into<String>, value: V) {
        self.items.lock().insert(key, value);
    }

    /// Clone an item out of the bag.
    pub fn item<V: Clone + 'static>(&self, key: &str) -> Option<V> {
        self.items.lock().get::<V>(key).cloned()
    }

    /// Run `f` with the item bag locked.
    pub fn with_items<R>(&self, f: impl FnOnce(&mut Items) -> R) -> R {
        f(&mut self.items.lock())
    }
}

/// Context for one resource-bound pipeline run: the scheduled-run shape
/// plus the triggering resource.
pub struct ResourceContext<T> {
    services: Arc<ServiceMap>,
    items: Mutex<Items>,
    resource: Resource<T>,
}

impl<T> ResourceContext<T> {
    pub fn new(services: Arc<ServiceMap>, resource: Resource<T>) -> Self {
        Self {
            services,
            items: Mutex::new(Items::default()),
            resource,
        }
    }

    /// The resource that triggered this run.
    pub fn resource(&self) -> &Resource<T> {
        &self.resource
    }

    pub fn services(&self) -> &ServiceMap {
        &self.services
    }

    pub fn service<S: Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        self.services.get::<S>()
    }

    pub fn insert_item<V: Send + Sync + 'static>(&self, key: impl Into<String>, value: V) {
        self.items.lock().insert(key, value);
    }

    pub fn item<V: Clone + 'static>(&self, key: &str) -> Option<V> {
        self.items.lock().get::<V>(key).cloned()
    }

    pub fn with_items<R>(&self, f: impl FnOnce(&mut Items) -> R) -> R {
        f(&mut self.items.lock())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
