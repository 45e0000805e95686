//! The fluent request chain.
//!
//! A chain accumulates normalized path segments and ends at a recognized
//! verb, producing one request description that the executor consumes by
//! value. Consuming the chain is what guarantees a clean slate for the next
//! request; there is no shared builder state to reset.
//!
//! Names can also be resolved dynamically with [`RequestChain::access`],
//! which applies the rule the chain grammar needs: a verb name that arrives
//! before any path segment is itself a path segment (`get`, `post`, and
//! `put` are all legitimate path components), so a verb only terminates a
//! chain that already has a path.

use serde_json::Value;

use surge_domain::{HttpVerb, PathSegment, SegmentFormat};

use crate::client::HttpClient;
use crate::payload::CallParams;
use crate::response::ApiResponse;

/// A chained endpoint path under construction.
#[derive(Debug)]
pub struct RequestChain<'c> {
    client: &'c HttpClient,
    segments: Vec<PathSegment>,
}

impl<'c> RequestChain<'c> {
    pub(crate) const fn new(client: &'c HttpClient) -> Self {
        Self {
            client,
            segments: Vec::new(),
        }
    }

    /// Appends one path segment; empty segments are dropped.
    #[must_use]
    pub fn path(mut self, segment: impl Into<PathSegment>) -> Self {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
        self
    }

    /// Appends a numeric resource id.
    #[must_use]
    pub fn id(self, id: u64) -> Self {
        self.path(PathSegment::numeric(id))
    }

    /// Appends a segment under an explicit case convention.
    #[must_use]
    pub fn path_formatted(self, raw: &str, format: SegmentFormat) -> Self {
        self.path(PathSegment::formatted(raw, format))
    }

    /// Returns the accumulated segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Resolves a dynamic name: a recognized verb terminates the chain once
    /// at least one segment has been accumulated; anything else (including a
    /// verb name on an empty chain) extends the path.
    #[must_use]
    pub fn access(self, name: &str) -> Access<'c> {
        match name.parse::<HttpVerb>() {
            Ok(verb) if !self.segments.is_empty() => Access::Verb(PendingCall { chain: self, verb }),
            _ => Access::Path(self.path(name)),
        }
    }

    /// Dispatches a GET for the accumulated path.
    pub async fn get(self) -> ApiResponse {
        self.dispatch(HttpVerb::Get, None, CallParams::default()).await
    }

    /// Dispatches a GET with call parameters.
    pub async fn get_with(self, params: CallParams) -> ApiResponse {
        self.dispatch(HttpVerb::Get, None, params).await
    }

    /// Dispatches a POST with a body.
    pub async fn post(self, body: Value) -> ApiResponse {
        self.dispatch(HttpVerb::Post, Some(body), CallParams::default()).await
    }

    /// Dispatches a POST with an optional body and call parameters.
    pub async fn post_with(self, body: Option<Value>, params: CallParams) -> ApiResponse {
        self.dispatch(HttpVerb::Post, body, params).await
    }

    /// Dispatches a PUT with a body.
    pub async fn put(self, body: Value) -> ApiResponse {
        self.dispatch(HttpVerb::Put, Some(body), CallParams::default()).await
    }

    /// Dispatches a PUT with an optional body and call parameters.
    pub async fn put_with(self, body: Option<Value>, params: CallParams) -> ApiResponse {
        self.dispatch(HttpVerb::Put, body, params).await
    }

    async fn dispatch(self, verb: HttpVerb, body: Option<Value>, params: CallParams) -> ApiResponse {
        let description = RequestDescription {
            verb,
            segments: self.segments,
            body,
            params,
        };
        self.client.dispatch(description).await
    }
}

/// Outcome of resolving one dynamic chain name.
#[derive(Debug)]
pub enum Access<'c> {
    /// The name extended the path.
    Path(RequestChain<'c>),
    /// The name terminated the chain.
    Verb(PendingCall<'c>),
}

impl<'c> Access<'c> {
    /// Returns the extended chain, if the name was a path segment.
    #[must_use]
    pub fn into_chain(self) -> Option<RequestChain<'c>> {
        match self {
            Self::Path(chain) => Some(chain),
            Self::Verb(_) => None,
        }
    }

    /// Returns the terminal call, if the name was a verb.
    #[must_use]
    pub fn into_call(self) -> Option<PendingCall<'c>> {
        match self {
            Self::Path(_) => None,
            Self::Verb(call) => Some(call),
        }
    }
}

/// A chain terminated by a recognized verb, ready to dispatch.
#[derive(Debug)]
pub struct PendingCall<'c> {
    chain: RequestChain<'c>,
    verb: HttpVerb,
}

impl PendingCall<'_> {
    /// Returns the terminating verb.
    #[must_use]
    pub const fn verb(&self) -> HttpVerb {
        self.verb
    }

    /// Dispatches the call, consuming the chain.
    pub async fn send(self, body: Option<Value>, params: CallParams) -> ApiResponse {
        self.chain.dispatch(self.verb, body, params).await
    }
}

/// An immutable request description, built by one chain and consumed once
/// by the executor.
#[derive(Debug)]
pub(crate) struct RequestDescription {
    pub(crate) verb: HttpVerb,
    pub(crate) segments: Vec<PathSegment>,
    pub(crate) body: Option<Value>,
    pub(crate) params: CallParams,
}
