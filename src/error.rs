//! Error types shared by the tiers, the facade and the reference backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::entity::EntityKind;

/// Outcome of a single tier call.
///
/// Only `Transport` lets the facade move on to the next tier; every other
/// variant is a business answer and is returned to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
}

pub type TierResult<T> = Result<T, TierError>;

/// Stable error kind surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    TransportFailure,
    NotFound,
    ValidationFailure,
    Unauthorized,
}

/// Error returned by every public facade and auth operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataAccessError {
    #[error("all backends unavailable: {0}")]
    Transport(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
}

impl DataAccessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataAccessError::Transport(_) => ErrorKind::TransportFailure,
            DataAccessError::NotFound { .. } => ErrorKind::NotFound,
            DataAccessError::Validation(_) => ErrorKind::ValidationFailure,
            DataAccessError::Unauthorized => ErrorKind::Unauthorized,
        }
    }
}

impl From<TierError> for DataAccessError {
    fn from(err: TierError) -> Self {
        match err {
            TierError::Transport(msg) => DataAccessError::Transport(msg),
            TierError::NotFound { kind, id } => DataAccessError::NotFound { kind, id },
            TierError::Validation(msg) => DataAccessError::Validation(msg),
            TierError::Unauthorized => DataAccessError::Unauthorized,
        }
    }
}

/// Failures of the durable key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("corrupt stored value under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StoreError> for TierError {
    fn from(err: StoreError) -> Self {
        TierError::Transport(err.to_string())
    }
}

/// Invalid environment configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be 'true' or 'false', got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
    #[error("invalid base URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
