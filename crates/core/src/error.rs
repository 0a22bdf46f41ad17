// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the core crate

use thiserror::Error;

/// Boxed error type carried by producer pulls and pipeline task chains.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration-time errors. All of these fail fast at construction,
/// never at runtime.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("producer hash can't be empty or whitespace")]
    EmptyProducerHash,
    #[error("producer name can't be empty or whitespace")]
    EmptyProducerName,
    #[error("producer '{producer}' is missing required setting '{field}'")]
    MissingSetting { producer: String, field: String },
    #[error("settings serialization failed: {0}")]
    Serialize(BoxError),
}

/// Raised when a cron expression fails to parse.
///
/// Invalid expressions are a configuration error and surface at parse
/// time, never lazily at occurrence queries.
#[derive(Debug, Error)]
#[error("invalid cron expression '{expr}': {reason}")]
pub struct CronParseError {
    pub expr: String,
    pub reason: String,
}
