//! Client error types

use thiserror::Error;

use surge_domain::DomainError;

/// Errors surfaced by the client crate.
///
/// Only construction and WebSocket plumbing produce errors; failed HTTP
/// responses are returned as data and recorded, never raised.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid client configuration; fatal and local to construction.
    #[error(transparent)]
    Configuration(#[from] DomainError),

    /// The underlying HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    /// The WebSocket connection could not be established.
    #[error("websocket connect failed: {0}")]
    Connect(String),

    /// The session driver has terminated; no further commands are accepted.
    #[error("websocket session is closed")]
    SessionClosed,

    /// An outbound message could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
