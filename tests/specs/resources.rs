// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end resource specs: a connector-style producer registered in
//! the registry, consumed by resource pipelines over a shared stream.

use crate::prelude::{settle, test_clock, wait_until};
use async_trait::async_trait;
use curator_core::{
    require_setting, BoxError, CoreError, CronSchedule, JsonSerializer, ProducerHash,
    ProducerIdentity, Resource, ResourceProducer, Serializer,
};
use curator_engine::{ProducerRegistry, RegistryError, ServiceMap};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct Quote {
    symbol: String,
    cents: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct Heartbeat;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuoteApiSettings {
    endpoint: String,
    token: String,
    cron: String,
}

/// Connector-style producer: validates its settings at construction and
/// fails fast when one is missing.
#[derive(Debug)]
struct QuoteApiProducer {
    identity: ProducerIdentity<QuoteApiSettings>,
    schedule: CronSchedule,
    pulls: AtomicU64,
}

impl QuoteApiProducer {
    fn new<Z: Serializer>(
        name: &str,
        settings: QuoteApiSettings,
        serializer: &Z,
    ) -> Result<Arc<Self>, BoxError> {
        require_setting(name, "endpoint", &settings.endpoint)?;
        require_setting(name, "token", &settings.token)?;
        let schedule = CronSchedule::parse(&settings.cron)?;
        let identity =
            ProducerIdentity::new(std::any::type_name::<Self>(), name, settings, serializer)?;
        Ok(Arc::new(Self {
            identity,
            schedule,
            pulls: AtomicU64::new(0),
        }))
    }

    fn default_settings() -> QuoteApiSettings {
        QuoteApiSettings {
            endpoint: "https://quotes.example.test/graphql".to_string(),
            token: "s3cret".to_string(),
            cron: "* * * * * *".to_string(),
        }
    }
}

#[async_trait]
impl ResourceProducer<Quote> for QuoteApiProducer {
    fn name(&self) -> &str {
        self.identity.name()
    }

    fn hash(&self) -> &ProducerHash {
        self.identity.hash()
    }

    fn schedule(&self) -> &CronSchedule {
        &self.schedule
    }

    async fn pull(&self) -> Result<Resource<Quote>, BoxError> {
        let n = self.pulls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Resource::new(
            self.identity.hash().clone(),
            self.identity.name(),
            Quote {
                symbol: "ACME".to_string(),
                cents: 100 + n,
            },
        ))
    }
}

#[test]
fn producer_construction_fails_fast_on_missing_settings() {
    let mut settings = QuoteApiProducer::default_settings();
    settings.token = String::new();

    let err = QuoteApiProducer::new("Quotes", settings, &JsonSerializer).unwrap_err();
    assert_eq!(
        err.to_string(),
        "producer 'Quotes' is missing required setting 'token'"
    );
    assert!(err.downcast_ref::<CoreError>().is_some());
}

#[test]
fn producer_construction_fails_fast_on_bad_cron() {
    let mut settings = QuoteApiProducer::default_settings();
    settings.cron = "whenever".to_string();

    let err = QuoteApiProducer::new("Quotes", settings, &JsonSerializer).unwrap_err();
    assert!(err.to_string().contains("invalid cron expression"));
}

#[test]
fn producer_identity_tracks_settings_content() {
    let a = QuoteApiProducer::new("Quotes", QuoteApiProducer::default_settings(), &JsonSerializer)
        .unwrap();
    let b = QuoteApiProducer::new("Quotes", QuoteApiProducer::default_settings(), &JsonSerializer)
        .unwrap();
    assert_eq!(a.hash(), b.hash());

    let mut changed = QuoteApiProducer::default_settings();
    changed.token = "rotated".to_string();
    let c = QuoteApiProducer::new("Quotes", changed, &JsonSerializer).unwrap();
    assert_ne!(a.hash(), c.hash());
}

#[test]
fn registry_rejects_lookup_for_wrong_resource_type() {
    let producer =
        QuoteApiProducer::new("Quotes", QuoteApiProducer::default_settings(), &JsonSerializer)
            .unwrap();
    let registry = ProducerRegistry::builder(Arc::new(test_clock()))
        .register::<Quote>(producer)
        .build()
        .unwrap();

    assert!(registry.stream::<Quote>("Quotes").is_ok());
    assert!(matches!(
        registry.stream::<Heartbeat>("Quotes"),
        Err(RegistryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn quotes_flow_from_producer_to_both_pipelines() {
    let clock = test_clock();
    let producer =
        QuoteApiProducer::new("Quotes", QuoteApiProducer::default_settings(), &JsonSerializer)
            .unwrap();
    let registry = ProducerRegistry::builder(Arc::new(clock.clone()))
        .register::<Quote>(producer.clone())
        .build()
        .unwrap();

    let alerts = Arc::new(Mutex::new(Vec::new()));
    let audit = Arc::new(Mutex::new(Vec::new()));

    // Two independent consumers of the same registered stream.
    let stream = registry.stream::<Quote>("Quotes").unwrap();
    let services = Arc::new(ServiceMap::new());

    let alert_sink = Arc::clone(&alerts);
    let _alert_pipeline = stream
        .pipeline("alerts", Arc::clone(&services))
        .task_fn(|ctx| {
            let quote = ctx.resource().value();
            ctx.insert_item("formatted", format!("{} @ {}", quote.symbol, quote.cents));
        })
        .task_fn(move |ctx| {
            if let Some(line) = ctx.item::<String>("formatted") {
                alert_sink.lock().push(line);
            }
        })
        .subscribe();

    let audit_sink = Arc::clone(&audit);
    let _audit_pipeline = stream
        .pipeline("audit", services)
        .task_fn(move |ctx| audit_sink.lock().push(ctx.resource().value().cents))
        .subscribe();
    settle().await;

    clock.advance(Duration::from_secs(1));
    wait_until(|| !alerts.lock().is_empty() && !audit.lock().is_empty()).await;
    settle().await;

    clock.advance(Duration::from_secs(1));
    wait_until(|| alerts.lock().len() == 2 && audit.lock().len() == 2).await;

    assert_eq!(*alerts.lock(), vec!["ACME @ 101", "ACME @ 102"]);
    assert_eq!(*audit.lock(), vec![101, 102]);
    // One pull per tick, shared across both pipelines.
    assert_eq!(producer.pulls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn a_bad_quote_stops_only_the_failing_pipeline() {
    let clock = test_clock();
    let producer =
        QuoteApiProducer::new("Quotes", QuoteApiProducer::default_settings(), &JsonSerializer)
            .unwrap();
    let registry = ProducerRegistry::builder(Arc::new(clock.clone()))
        .register::<Quote>(producer)
        .build()
        .unwrap();

    let stream = registry.stream::<Quote>("Quotes").unwrap();
    let services = Arc::new(ServiceMap::new());

    let failures = Arc::new(Mutex::new(Vec::new()));
    let survivor_seen = Arc::new(AtomicU64::new(0));

    let sink = Arc::clone(&failures);
    let fragile = stream
        .pipeline("fragile", Arc::clone(&services))
        .on_failure(move |pipeline, err| sink.lock().push(format!("{pipeline}: {err}")))
        .task(|_next| {
            Arc::new(|_ctx| -> curator_engine::TaskFuture {
                Box::pin(async { Err("unparseable payload".into()) })
            })
        })
        .subscribe();

    let seen = Arc::clone(&survivor_seen);
    let _survivor = stream
        .pipeline("survivor", services)
        .task_fn(move |ctx| seen.store(ctx.resource().value().cents, Ordering::SeqCst))
        .subscribe();
    settle().await;

    clock.advance(Duration::from_secs(1));
    wait_until(|| failures.lock().len() == 1).await;
    wait_until(|| !fragile.is_active()).await;
    settle().await;

    // The failing pipeline's subscription ended for good; the other
    // keeps consuming.
    clock.advance(Duration::from_secs(1));
    wait_until(|| survivor_seen.load(Ordering::SeqCst) == 102).await;

    assert_eq!(failures.lock()[0], "fragile: unparseable payload");
    assert_eq!(failures.lock().len(), 1);
}
