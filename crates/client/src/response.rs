//! Normalized responses and status validation.

use std::borrow::Cow;
use std::time::Duration;

use surge_domain::{HeaderMap, HttpVerb};

/// Summary of the dispatched request, attached to each response for
/// inspection and error capture.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    /// The dispatched verb.
    pub verb: HttpVerb,
    /// The final URL, query string and SOAP suffix included.
    pub url: String,
    /// The headers that went on the wire.
    pub headers: HeaderMap,
}

impl RequestSummary {
    /// Renders the `VERB url` request line.
    #[must_use]
    pub fn request_line(&self) -> String {
        format!("{} {}", self.verb, self.url)
    }
}

/// A normalized response. Every dispatch returns one of these; transport
/// failures yield a degenerate response (status `0`) instead of an error.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status, `0` when no response arrived.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
    /// What was sent.
    pub request: RequestSummary,
    /// Status reason or transport error description, when available.
    pub error_code: Option<String>,
    /// Wall-clock time from dispatch to body completion.
    pub duration: Duration,
}

impl ApiResponse {
    /// Builds a degenerate response for a request that produced no response
    /// at all.
    #[must_use]
    pub fn degenerate(request: RequestSummary, error_code: Option<String>) -> Self {
        Self {
            status: 0,
            headers: HeaderMap::new(),
            body: Vec::new(),
            request,
            error_code,
            duration: Duration::ZERO,
        }
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text, lossily for non-UTF-8 payloads.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parse error for non-JSON bodies.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Status windows used by response validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// 2xx: the request did what it was asked.
    Success,
    /// 4xx/5xx: the target rejected or failed the request; recorded with
    /// full detail and still returned.
    Failure,
    /// Anything else, including the absence of a response; recorded as a
    /// degenerate error.
    OutOfEnvelope,
}

impl Validation {
    /// Classifies a status code.
    #[must_use]
    pub fn of_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            400..=599 => Self::Failure,
            _ => Self::OutOfEnvelope,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn summary() -> RequestSummary {
        RequestSummary {
            verb: HttpVerb::Get,
            url: "http://h/api".to_string(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_request_line() {
        assert_eq!(summary().request_line(), "GET http://h/api");
    }

    #[test]
    fn test_validation_windows() {
        assert_eq!(Validation::of_status(200), Validation::Success);
        assert_eq!(Validation::of_status(299), Validation::Success);
        assert_eq!(Validation::of_status(404), Validation::Failure);
        assert_eq!(Validation::of_status(500), Validation::Failure);
        assert_eq!(Validation::of_status(599), Validation::Failure);
        assert_eq!(Validation::of_status(0), Validation::OutOfEnvelope);
        assert_eq!(Validation::of_status(101), Validation::OutOfEnvelope);
        assert_eq!(Validation::of_status(301), Validation::OutOfEnvelope);
    }

    #[test]
    fn test_degenerate_response() {
        let response = ApiResponse::degenerate(summary(), Some("connection refused".to_string()));
        assert_eq!(response.status, 0);
        assert!(!response.is_success());
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_json_accessor() {
        let mut response = ApiResponse::degenerate(summary(), None);
        response.body = br#"{"breeds":[]}"#.to_vec();
        assert_eq!(response.json().unwrap()["breeds"], serde_json::json!([]));
        assert_eq!(response.text(), r#"{"breeds":[]}"#);
    }
}
