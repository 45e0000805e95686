//! Structured error capture.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::headers::HeaderMap;

/// Structured detail for one failed request.
///
/// A recorder keeps a single "last error" slot; each new failure overwrites
/// the previous record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Request line, `VERB url`.
    pub request: String,
    /// Headers sent with the failing request.
    pub request_headers: HeaderMap,
    /// Response status, `0` when no response arrived.
    pub status: u16,
    /// Server error code, when one was reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Response body, parsed as JSON when possible.
    pub error_body: serde_json::Value,
    /// Headers received with the failing response.
    pub response_headers: HeaderMap,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied context tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ErrorRecord {
    /// Builds a record timestamped at the moment of the call.
    #[must_use]
    pub fn new(
        request: String,
        request_headers: HeaderMap,
        status: u16,
        error_code: Option<String>,
        error_body: serde_json::Value,
        response_headers: HeaderMap,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            request,
            request_headers,
            status,
            error_code,
            error_body,
            response_headers,
            timestamp: Utc::now(),
            tags,
        }
    }

    /// Builds an empty record for a response that never arrived or fell
    /// outside every recognized status window.
    #[must_use]
    pub fn degenerate(tags: BTreeMap<String, String>) -> Self {
        Self::new(
            String::new(),
            HeaderMap::new(),
            0,
            None,
            serde_json::Value::Null,
            HeaderMap::new(),
            tags,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_degenerate_record() {
        let record = ErrorRecord::degenerate(BTreeMap::new());
        assert_eq!(record.status, 0);
        assert_eq!(record.error_body, serde_json::Value::Null);
        assert!(record.request.is_empty());
    }

    #[test]
    fn test_serializes_with_snake_case_fields() {
        let mut tags = BTreeMap::new();
        tags.insert("scenario".to_string(), "breeds".to_string());
        let record = ErrorRecord::new(
            "GET http://h/api".to_string(),
            HeaderMap::new(),
            404,
            Some("Not Found".to_string()),
            serde_json::json!({"message": "missing"}),
            HeaderMap::new(),
            tags,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["request"], "GET http://h/api");
        assert_eq!(value["status"], 404);
        assert_eq!(value["error_code"], "Not Found");
        assert_eq!(value["tags"]["scenario"], "breeds");
        assert!(value["timestamp"].is_string());
    }
}
