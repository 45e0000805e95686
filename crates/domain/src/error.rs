//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while building client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Neither a host nor a base URL was provided at construction.
    #[error("either a host or a base URL must be provided")]
    MissingTarget,

    /// The provided base URL is malformed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The HTTP verb is not part of the recognized set.
    #[error("unsupported HTTP verb: {0}")]
    UnsupportedVerb(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
