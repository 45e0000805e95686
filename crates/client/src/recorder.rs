//! Structured error capture for failed responses.
//!
//! One recorder per client, one "last error" slot per recorder; concurrent
//! iterations never share a slot.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use surge_domain::ErrorRecord;

use crate::response::ApiResponse;

/// Classifies failed responses into [`ErrorRecord`]s, keeps the most recent
/// one, and emits each synchronously through the logging layer.
#[derive(Debug, Default)]
pub struct ErrorRecorder {
    last: Mutex<Option<ErrorRecord>>,
}

impl ErrorRecorder {
    /// Creates a recorder with an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Records a failure. No-op unless `is_error` is true and a response
    /// object exists. Never panics.
    pub fn record(
        &self,
        is_error: bool,
        response: Option<&ApiResponse>,
        tags: &BTreeMap<String, String>,
    ) {
        if !is_error {
            return;
        }
        let Some(response) = response else {
            return;
        };

        let record = ErrorRecord::new(
            response.request.request_line(),
            response.request.headers.clone(),
            response.status,
            response.error_code.clone(),
            error_body(response),
            response.headers.clone(),
            tags.clone(),
        );
        self.store(record);
    }

    /// Records an empty error for a response that never arrived or fell
    /// outside every recognized status window.
    pub fn record_degenerate(&self, tags: &BTreeMap<String, String>) {
        self.store(ErrorRecord::degenerate(tags.clone()));
    }

    /// Returns a copy of the most recent error record, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, record: ErrorRecord) {
        match serde_json::to_string(&record) {
            Ok(detail) => tracing::error!(target: "surge::recorder", %detail, "request failed"),
            Err(e) => tracing::error!(target: "surge::recorder", error = %e, "request failed"),
        }
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
    }
}

fn error_body(response: &ApiResponse) -> Value {
    if response.body.is_empty() {
        return Value::Null;
    }
    response
        .json()
        .unwrap_or_else(|_| Value::String(response.text().into_owned()))
}
