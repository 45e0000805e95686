//! Surge Domain - Core types for the load-testing client
//!
//! This crate defines the domain model for the Surge HTTP/WebSocket client.
//! All types here are pure Rust with no I/O dependencies: target resolution,
//! credential material, header composition, path normalization, error
//! records, and WebSocket framing.

pub mod config;
pub mod credentials;
pub mod error;
pub mod headers;
pub mod path;
pub mod record;
pub mod target;
pub mod verb;
pub mod ws;

pub use config::{ClientConfig, ClientOptions};
pub use credentials::{Authenticator, CredentialDefaults, Credentials};
pub use error::{DomainError, DomainResult};
pub use headers::HeaderMap;
pub use path::{PathSegment, SegmentFormat, join_segments};
pub use record::ErrorRecord;
pub use target::{BaseUrl, Protocol, TargetSpec};
pub use verb::HttpVerb;
pub use ws::{
    CLOSE_ABNORMAL, CLOSE_NORMAL, HandshakeFrame, HubFrame, NORMAL_CLOSE_REASON, RECORD_SEPARATOR,
    SessionState, SessionTags, TIMEOUT_CLOSE_REASON,
};
