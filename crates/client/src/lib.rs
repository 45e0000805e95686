//! Surge Client - fluent HTTP and WebSocket requests for load testing
//!
//! Each logical test iteration owns one [`HttpClient`] (and zero or more
//! [`WsSession`]s). The client composes its configuration once at
//! construction, then lets the caller express endpoints as a chained path
//! instead of URL strings:
//!
//! ```rust,no_run
//! use surge_client::HttpClient;
//! use surge_domain::{ClientOptions, Protocol, TargetSpec};
//!
//! # async fn run() -> Result<(), surge_client::ClientError> {
//! let client = HttpClient::new(ClientOptions::new(
//!     TargetSpec::from_host("mock-api:3000").with_protocol(Protocol::Http),
//! ))?;
//!
//! // GET http://mock-api:3000/api/v2/breeds/42
//! let response = client.chain().path("api").path("v2").path("breeds").id(42).get().await;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! Failed responses are captured as structured [`surge_domain::ErrorRecord`]s
//! on the client's [`ErrorRecorder`] rather than raised; only configuration
//! mistakes fail fast.

pub mod chain;
pub mod client;
pub mod env;
pub mod error;
pub mod payload;
pub mod recorder;
pub mod response;
pub mod ws;

pub use chain::{Access, PendingCall, RequestChain};
pub use client::{HttpClient, SignalRNegotiation};
pub use env::{EnvNames, credentials_from_env, credentials_from_env_with, credentials_from_lookup};
pub use error::{ClientError, ClientResult};
pub use payload::{
    CallParams, RequestPayload, ResponseType, SOAP_CONTENT_TYPE, TEXT_XML_CONTENT_TYPE,
    encode_query,
};
pub use recorder::ErrorRecorder;
pub use response::{ApiResponse, RequestSummary, Validation};
pub use ws::{DEFAULT_SESSION_TIMEOUT, TargetHandler, WsEvent, WsOptions, WsSession};
