//! Request body classification and per-call parameters.
//!
//! A body takes the SOAP branch exactly when it carries both
//! `queryParams.soapPath` and `queryParams.soapBody`; every other shape is
//! the JSON branch, with `queryParams` lifted into the URL query string.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use surge_domain::HeaderMap;

/// Default SOAP content type.
pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml";

/// Alternative XML content type for targets expecting classic SOAP 1.1.
pub const TEXT_XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// How the response body should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Capture the body as text.
    #[default]
    Text,
    /// Capture the body as raw bytes.
    Binary,
    /// Discard the body.
    None,
}

/// Per-call parameter overrides, shallow-merged over the client-level
/// defaults; call-level entries win.
#[derive(Debug, Clone, Default)]
pub struct CallParams {
    /// Extra headers for this call, merged over the client headers per key.
    pub headers: HeaderMap,
    /// Context tags attached to any resulting error record.
    pub tags: BTreeMap<String, String>,
    /// Response body handling for this call.
    pub response_type: Option<ResponseType>,
    /// Per-call request timeout.
    pub timeout: Option<Duration>,
    /// Content type used on the SOAP branch; defaults to
    /// [`SOAP_CONTENT_TYPE`].
    pub soap_content_type: Option<String>,
}

impl CallParams {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header override.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds an error-record tag.
    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Sets the response type.
    #[must_use]
    pub const fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Sets a per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Selects the SOAP content type for this call.
    #[must_use]
    pub fn with_soap_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.soap_content_type = Some(content_type.into());
        self
    }
}

/// A classified request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    /// No body.
    Empty,
    /// JSON branch: query string (empty or `?`-prefixed) plus the
    /// serialized remainder of the body.
    Json {
        /// Encoded query string.
        query: String,
        /// JSON text for the wire.
        body: Option<String>,
    },
    /// SOAP branch: URL path suffix plus the literal envelope.
    Soap {
        /// Appended to the URL as `/{path}`.
        path: String,
        /// Sent verbatim as the wire body.
        envelope: String,
    },
}

impl RequestPayload {
    /// Classifies a body into its branch.
    ///
    /// The SOAP branch is selected if and only if the body carries string
    /// values at both `queryParams.soapPath` and `queryParams.soapBody`.
    #[must_use]
    pub fn classify(body: Option<Value>) -> Self {
        let Some(mut body) = body else {
            return Self::Empty;
        };

        if let Some(query_params) = body.get("queryParams") {
            let soap_path = query_params.get("soapPath").and_then(Value::as_str);
            let soap_body = query_params.get("soapBody").and_then(Value::as_str);
            if let (Some(path), Some(envelope)) = (soap_path, soap_body) {
                return Self::Soap {
                    path: path.to_string(),
                    envelope: envelope.to_string(),
                };
            }
        }

        let query = body
            .as_object_mut()
            .and_then(|object| object.remove("queryParams"))
            .map(|params| encode_query(&query_map(&params)))
            .unwrap_or_default();
        let body = serde_json::to_string(&body).ok();
        Self::Json { query, body }
    }
}

/// URL-encodes a query map: `?`-prefixed pairs in key order, or the empty
/// string (never a bare `?`) for an empty map.
#[must_use]
pub fn encode_query(params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return String::new();
    }
    serde_urlencoded::to_string(params)
        .map(|encoded| format!("?{encoded}"))
        .unwrap_or_default()
}

// Flattens JSON scalars into their query-string text; nulls and nested
// values never reach the query string.
fn query_map(params: &Value) -> BTreeMap<String, String> {
    let Some(object) = params.as_object() else {
        return BTreeMap::new();
    };
    object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}
