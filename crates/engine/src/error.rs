// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;

/// Errors from the curator scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CuratorError {
    #[error("curator is already running")]
    AlreadyRunning,
    #[error("pipeline name can't be empty or whitespace")]
    EmptyPipelineName,
}

/// Errors from the producer registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resource producer '{name}' isn't registered for resource type '{resource_type}'; register it before building the registry")]
    NotFound {
        name: String,
        resource_type: &'static str,
    },
    #[error("resource producer '{name}' is already registered for resource type '{resource_type}'")]
    DuplicateRegistration {
        name: String,
        resource_type: &'static str,
    },
}
