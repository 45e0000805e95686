//! WebSocket session types and SignalR-style framing.
//!
//! Hub frames are JSON texts terminated by a record-separator control
//! character; [`HubFrame::parse`] strips the separator and pulls out the
//! `target` discriminator used for handler dispatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a WebSocket session. `Closed` is terminal; sessions never
/// reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Connection in progress.
    #[default]
    Connecting,
    /// Connected and ready.
    Open,
    /// Close initiated, awaiting completion.
    Closing,
    /// Terminal.
    Closed,
}

impl SessionState {
    /// Returns true while messages may be sent.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true once the session has fully terminated.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Close code for a normal closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Abnormal-closure code, reported when the session timeout force-closes
/// the socket or the transport dies without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Reason attached to normal closures.
pub const NORMAL_CLOSE_REASON: &str = "Normal Closure";

/// Reason attached to timeout closures.
pub const TIMEOUT_CLOSE_REASON: &str = "Connection Timeout";

/// Record separator terminating handshake and hub frames.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Protocol negotiation frame transmitted right after the socket opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeFrame {
    /// Hub protocol name.
    pub protocol: String,
    /// Hub protocol version.
    pub version: u32,
}

impl Default for HandshakeFrame {
    fn default() -> Self {
        Self {
            protocol: "json".to_string(),
            version: 1,
        }
    }
}

impl HandshakeFrame {
    /// Renders the frame as wire text, record separator included.
    #[must_use]
    pub fn to_wire(&self) -> String {
        // Serialization of two plain fields cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("{json}{RECORD_SEPARATOR}")
    }
}

/// A parsed inbound hub frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HubFrame {
    /// Dispatch discriminator; frames without one are plain protocol
    /// messages (handshake acks, pings).
    pub target: Option<String>,
    /// The full frame body.
    pub body: serde_json::Value,
}

impl HubFrame {
    /// Parses wire text into a frame: strips the record separator, parses
    /// JSON, extracts the `target` field.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed frames; callers log and keep
    /// the session alive.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let trimmed = raw.trim_end_matches(RECORD_SEPARATOR);
        let body: serde_json::Value = serde_json::from_str(trimmed)?;
        let target = body
            .get("target")
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        Ok(Self { target, body })
    }
}

/// Tags attached to every session event, always carrying the session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTags {
    session_id: String,
    extra: BTreeMap<String, String>,
}

impl SessionTags {
    /// Creates tags with the given or a freshly generated v4 session id.
    #[must_use]
    pub fn new(session_id: Option<String>, extra: BTreeMap<String, String>) -> Self {
        Self {
            session_id: session_id
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            extra,
        }
    }

    /// Returns the session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Flattens into one map, caller tags layered over the session id.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("sessionId".to_string(), self.session_id.clone());
        map.extend(self.extra.clone());
        map
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_handshake_wire_format() {
        let wire = HandshakeFrame::default().to_wire();
        assert_eq!(wire, "{\"protocol\":\"json\",\"version\":1}\u{1e}");
    }

    #[test]
    fn test_parse_frame_with_target() {
        let frame = HubFrame::parse("{\"target\":\"priceUpdate\",\"arguments\":[1]}\u{1e}")
            .unwrap();
        assert_eq!(frame.target.as_deref(), Some("priceUpdate"));
        assert_eq!(frame.body["arguments"][0], 1);
    }

    #[test]
    fn test_parse_frame_without_target() {
        let frame = HubFrame::parse("{}\u{1e}").unwrap();
        assert_eq!(frame.target, None);

        let frame = HubFrame::parse("{\"target\":\"\"}").unwrap();
        assert_eq!(frame.target, None);
    }

    #[test]
    fn test_parse_rejects_malformed_frames() {
        assert!(HubFrame::parse("not json\u{1e}").is_err());
    }

    #[test]
    fn test_session_tags_generate_id() {
        let tags = SessionTags::new(None, BTreeMap::new());
        assert!(!tags.session_id().is_empty());
        assert_eq!(
            tags.to_map().get("sessionId"),
            Some(&tags.session_id().to_string())
        );
    }

    #[test]
    fn test_session_tags_keep_supplied_id() {
        let tags = SessionTags::new(Some("abc".to_string()), BTreeMap::new());
        assert_eq!(tags.session_id(), "abc");
    }

    #[test]
    fn test_session_state() {
        assert!(SessionState::Open.is_open());
        assert!(!SessionState::Connecting.is_open());
        assert!(SessionState::Closed.is_terminal());
        assert!(!SessionState::Closing.is_terminal());
    }
}
