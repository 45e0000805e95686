//! HTTP client and request executor.
//!
//! The client composes its [`ClientConfig`] once at construction and owns
//! the error recorder for its iteration. Requests either come from a
//! [`RequestChain`] or name an explicit URL; both funnel through the same
//! executor, which branches the body, merges call parameters, dispatches
//! through reqwest, and normalizes whatever comes back.

use std::time::Instant;

use reqwest::Method;
use serde_json::Value;

use surge_domain::{ClientConfig, ClientOptions, HttpVerb, join_segments};

use crate::chain::{RequestChain, RequestDescription};
use crate::error::{ClientError, ClientResult};
use crate::payload::{CallParams, RequestPayload, ResponseType, SOAP_CONTENT_TYPE};
use crate::recorder::ErrorRecorder;
use crate::response::{ApiResponse, RequestSummary, Validation};

/// A per-iteration HTTP client.
///
/// Runtime request failures never raise: they come back as degraded
/// responses with the detail captured on the [`ErrorRecorder`]. Only
/// configuration problems fail construction.
#[derive(Debug)]
pub struct HttpClient {
    config: ClientConfig,
    http: reqwest::Client,
    recorder: ErrorRecorder,
}

impl HttpClient {
    /// Builds the client configuration once and the underlying transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the target cannot resolve, or
    /// [`ClientError::HttpClient`] when the transport cannot be created.
    pub fn new(options: ClientOptions) -> ClientResult<Self> {
        let config = options.build()?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;
        Ok(Self {
            config,
            http,
            recorder: ErrorRecorder::new(),
        })
    }

    /// Returns the immutable client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns this client's error recorder.
    #[must_use]
    pub const fn recorder(&self) -> &ErrorRecorder {
        &self.recorder
    }

    /// Starts an empty request chain.
    #[must_use]
    pub const fn chain(&self) -> RequestChain<'_> {
        RequestChain::new(self)
    }

    /// Executes a request against an explicit URL, bypassing the chain.
    pub async fn request(
        &self,
        verb: HttpVerb,
        url: impl Into<String>,
        body: Option<Value>,
        params: CallParams,
    ) -> ApiResponse {
        self.execute(verb, url.into(), body, params).await
    }

    /// Fetches SignalR hub connection details from a negotiate endpoint.
    ///
    /// Returns `None` (with a warning log) when the response lacks the
    /// connection id or token.
    pub async fn negotiate_signalr(
        &self,
        verb: HttpVerb,
        path: &str,
    ) -> Option<SignalRNegotiation> {
        let params = CallParams::new().with_response_type(ResponseType::Text);
        let url = self.config.base_url().join(path);
        let response = self.request(verb, url, None, params).await;

        if response.status == 200 {
            if let Ok(body) = response.json() {
                let connection_id = body
                    .get("connectionId")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let connection_token = body
                    .get("connectionToken")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if !connection_id.is_empty() && !connection_token.is_empty() {
                    return Some(SignalRNegotiation {
                        connection_id: connection_id.to_string(),
                        connection_token: connection_token.to_string(),
                    });
                }
            }
        }
        tracing::warn!(
            target: "surge::client",
            status = response.status,
            "websocket connection details not found"
        );
        None
    }

    pub(crate) async fn dispatch(&self, description: RequestDescription) -> ApiResponse {
        let path = join_segments(&description.segments);
        let url = self.config.base_url().join(&path);
        self.execute(description.verb, url, description.body, description.params)
            .await
    }

    async fn execute(
        &self,
        verb: HttpVerb,
        mut url: String,
        body: Option<Value>,
        params: CallParams,
    ) -> ApiResponse {
        let mut headers = self.config.headers().clone();
        headers.merge(&params.headers);

        let wire_body = match RequestPayload::classify(body) {
            RequestPayload::Empty => None,
            RequestPayload::Json { query, body } => {
                url.push_str(&query);
                body
            }
            RequestPayload::Soap { path, envelope } => {
                url = format!("{}/{path}", url.trim_end_matches('/'));
                let content_type = params
                    .soap_content_type
                    .clone()
                    .unwrap_or_else(|| SOAP_CONTENT_TYPE.to_string());
                headers.set("Content-Type", content_type);
                Some(envelope)
            }
        };

        let summary = RequestSummary {
            verb,
            url: url.clone(),
            headers: headers.clone(),
        };
        tracing::debug!(target: "surge::client", request = %summary.request_line(), "dispatching");

        let mut builder = self.http.request(to_reqwest_method(verb), &url);
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = params.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = wire_body {
            builder = builder.body(body);
        }

        let started = Instant::now();
        let response = match builder.send().await {
            Ok(response) => {
                normalize(
                    response,
                    summary,
                    params.response_type.unwrap_or_default(),
                    started,
                )
                .await
            }
            Err(e) => {
                tracing::debug!(target: "surge::client", error = %e, "transport failure");
                self.recorder.record_degenerate(&params.tags);
                return ApiResponse::degenerate(summary, Some(e.to_string()));
            }
        };
        self.validate(response, &params)
    }

    fn validate(&self, response: ApiResponse, params: &CallParams) -> ApiResponse {
        match Validation::of_status(response.status) {
            Validation::Success => response,
            Validation::Failure => {
                self.recorder.record(true, Some(&response), &params.tags);
                response
            }
            Validation::OutOfEnvelope => {
                self.recorder.record_degenerate(&params.tags);
                response
            }
        }
    }
}

/// Hub connection details returned by a SignalR negotiate endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRNegotiation {
    /// The negotiated connection id.
    pub connection_id: String,
    /// The negotiated connection token.
    pub connection_token: String,
}

const fn to_reqwest_method(verb: HttpVerb) -> Method {
    match verb {
        HttpVerb::Get => Method::GET,
        HttpVerb::Post => Method::POST,
        HttpVerb::Put => Method::PUT,
    }
}

async fn normalize(
    response: reqwest::Response,
    request: RequestSummary,
    response_type: ResponseType,
    started: Instant,
) -> ApiResponse {
    let status = response.status();
    let error_code = if status.is_success() {
        None
    } else {
        status.canonical_reason().map(ToString::to_string)
    };
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect();

    let body = match response_type {
        ResponseType::None => {
            let _ = response.bytes().await;
            Vec::new()
        }
        ResponseType::Text | ResponseType::Binary => response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default(),
    };

    ApiResponse {
        status: status.as_u16(),
        headers,
        body,
        request,
        error_code,
        duration: started.elapsed(),
    }
}
