//! Domain errors for the storefront data layer.

use thiserror::Error;

use crate::domain::models::ResourceKind;

/// Domain-level errors surfaced by the API port and the query services.
///
/// Errors coming back from a mutation are returned to the caller unchanged;
/// the cache layer never wraps them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether a read that failed with this error is worth retrying.
    ///
    /// Network failures, rate limiting and server errors are transient.
    /// Every other 4xx is a caller problem and retrying cannot fix it.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::NotFound { .. } | Self::Validation(_) | Self::TaskFailed(_) => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(DomainError::Transport("reset".into()).is_transient());
        assert!(DomainError::Api { status: 429, body: String::new() }.is_transient());
        assert!(DomainError::Api { status: 503, body: String::new() }.is_transient());
        assert!(!DomainError::Api { status: 400, body: String::new() }.is_transient());
        assert!(!DomainError::Api { status: 422, body: String::new() }.is_transient());
        assert!(!DomainError::Validation("bad".into()).is_transient());
        assert!(!DomainError::NotFound {
            kind: ResourceKind::Orders,
            id: "o1".into()
        }
        .is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::NotFound {
            kind: ResourceKind::Subscriptions,
            id: "sub_1".into(),
        };
        assert_eq!(err.to_string(), "subscriptions not found: sub_1");

        let err = DomainError::Api {
            status: 422,
            body: "{\"detail\":\"invalid\"}".into(),
        };
        assert_eq!(err.to_string(), "API returned 422: {\"detail\":\"invalid\"}");
    }
}
