//! Roster - reconcile BambooHR employee feeds into a unified roster.
//!
//! This library provides the core functionality for the `roster` CLI tool:
//! merging the employee directory with a custom report, deriving computed
//! fields, resolving managers by display name, and building the management
//! hierarchy.

pub mod bamboo;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod output;
pub mod reconcile;

use reconcile::ReconciliationError;

/// Library-level error type for Roster operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(
        "Missing required configuration: {}. Set them in the environment or in roster.kdl",
        .0.join(", ")
    )]
    MissingConfig(Vec<String>),

    #[error("Failed to generate employees: {0}")]
    Reconciliation(#[from] ReconciliationError),
}

/// Result type alias for Roster operations.
pub type Result<T> = std::result::Result<T, Error>;
