//! Backend query surface.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::{Collection, Query};

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend is not configured (set backend.url)")]
    NotConfigured,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Transient failures worth one more attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || matches!(status, 408 | 429),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Generic fetch/mutate operations over named collections.
///
/// Every call returns rows as JSON objects; writes return the affected rows.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, collection: Collection, query: &Query)
    -> Result<Vec<Value>, BackendError>;

    async fn insert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, BackendError>;

    /// Insert, or merge into the row whose `on_conflict` column matches.
    async fn upsert(
        &self,
        collection: Collection,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> Result<Vec<Value>, BackendError>;

    async fn update(
        &self,
        collection: Collection,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError>;

    async fn delete(&self, collection: Collection, query: &Query)
    -> Result<Vec<Value>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(BackendError::Transport("reset".into()).is_retryable());
        assert!(
            BackendError::Status {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            BackendError::Status {
                status: 429,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !BackendError::Status {
                status: 404,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!BackendError::Decode("x".into()).is_retryable());
        assert!(!BackendError::NotConfigured.is_retryable());
    }
}
