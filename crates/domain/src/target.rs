//! Target origin resolution.
//!
//! A client is pointed at a target either with an explicit base URL or with
//! host/protocol/port parts. [`BaseUrl::resolve`] computes the canonical
//! origin string, omitting the port when it matches the protocol default.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Wire protocol for a target origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
    /// Plain WebSocket.
    Ws,
    /// WebSocket over TLS.
    Wss,
}

impl Protocol {
    /// Returns the URL scheme for this protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }

    /// Returns the implicit default port (443 for https/wss, 80 for http/ws).
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Https | Self::Wss => 443,
            Self::Http | Self::Ws => 80,
        }
    }

    /// Returns true if `port` is this protocol's implicit default.
    #[must_use]
    pub const fn is_default_port(self, port: u16) -> bool {
        port == self.default_port()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inputs for resolving a target origin.
///
/// Exactly one of `base_url` or `host` must be present; `base_url` wins when
/// both are given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Explicit base URL, authoritative when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Host name, optionally carrying an embedded `:port`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// URL scheme, `https` unless stated otherwise.
    #[serde(default)]
    pub protocol: Protocol,
    /// Explicit port, omitted from the origin when it matches the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl TargetSpec {
    /// Creates a spec from a host name.
    #[must_use]
    pub fn from_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Creates a spec from an explicit base URL.
    #[must_use]
    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Sets the protocol.
    #[must_use]
    pub const fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets an explicit port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Resolves this spec into a canonical origin.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingTarget`] when neither host nor base URL
    /// is present, or [`DomainError::InvalidBaseUrl`] when an explicit base
    /// URL does not parse.
    pub fn resolve(&self) -> DomainResult<BaseUrl> {
        BaseUrl::resolve(self)
    }
}

/// A canonical, non-empty origin string such as `https://api.example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Computes the canonical origin for `spec`.
    ///
    /// An explicit base URL is validated and taken verbatim (sans trailing
    /// slash). Otherwise the origin is synthesized as
    /// `protocol://host[:port]`, with the port left out when unspecified or
    /// equal to the protocol default.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingTarget`] when neither host nor base URL
    /// is present, or [`DomainError::InvalidBaseUrl`] for an unparseable
    /// explicit base URL.
    pub fn resolve(spec: &TargetSpec) -> DomainResult<Self> {
        if let Some(base) = spec.base_url.as_deref().filter(|s| !s.is_empty()) {
            Url::parse(base).map_err(|e| DomainError::InvalidBaseUrl(format!("{e}: {base}")))?;
            return Ok(Self(base.trim_end_matches('/').to_string()));
        }

        let host = spec
            .host
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(DomainError::MissingTarget)?;

        let origin = match spec.port {
            Some(port) if !spec.protocol.is_default_port(port) => {
                format!("{}://{host}:{port}", spec.protocol)
            }
            _ => format!("{}://{host}", spec.protocol),
        };
        Ok(Self(origin))
    }

    /// Returns the origin as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a path to the origin with a single `/` separator.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
