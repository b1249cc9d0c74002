//! Cloud reconciliation error types

use std::fmt::Display;
use thiserror::Error;

/// Errors surfaced by controllers, the network orchestrator and provider adapters.
///
/// Provider adapters classify each failed call as a lookup, a mutation or a
/// convergence wait; controllers propagate the error unchanged.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Lookup failed ({operation}): {message}")]
    Lookup {
        operation: &'static str,
        message: String,
    },

    #[error("Mutation rejected ({operation}): {message}")]
    Mutation {
        operation: &'static str,
        message: String,
    },

    #[error("Timed out waiting for {resource}: {message}")]
    Convergence { resource: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
}

impl CloudError {
    pub fn lookup(operation: &'static str, err: impl Display) -> Self {
        Self::Lookup {
            operation,
            message: err.to_string(),
        }
    }

    pub fn mutation(operation: &'static str, err: impl Display) -> Self {
        Self::Mutation {
            operation,
            message: err.to_string(),
        }
    }

    pub fn convergence(resource: impl Into<String>, err: impl Display) -> Self {
        Self::Convergence {
            resource: resource.into(),
            message: err.to_string(),
        }
    }

    /// Whether the error came out of a wait-for-ready call
    pub fn is_convergence(&self) -> bool {
        matches!(self, Self::Convergence { .. })
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
