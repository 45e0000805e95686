//! Client configuration assembly.
//!
//! [`ClientOptions::build`] composes the target origin, credential
//! resolution, and header composition exactly once; the resulting
//! [`ClientConfig`] is immutable and read by every subsequent request.

use serde::{Deserialize, Serialize};

use crate::credentials::{Authenticator, CredentialDefaults};
use crate::error::DomainResult;
use crate::headers::HeaderMap;
use crate::target::{BaseUrl, TargetSpec};

/// Inputs for building a client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Where requests go.
    pub target: TargetSpec,
    /// Caller-supplied headers; the default API set applies when absent.
    pub headers: Option<HeaderMap>,
    /// Explicit basic-auth username.
    pub username: Option<String>,
    /// Explicit basic-auth password.
    pub password: Option<String>,
    /// Explicit bearer token.
    pub token: Option<String>,
    /// Injected fallback credentials (environment snapshot).
    pub defaults: CredentialDefaults,
}

impl ClientOptions {
    /// Creates options for a target.
    #[must_use]
    pub fn new(target: TargetSpec) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Replaces the default header set.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Sets explicit basic-auth credentials.
    #[must_use]
    pub fn with_basic(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets an explicit bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Injects fallback credentials.
    #[must_use]
    pub fn with_credential_defaults(mut self, defaults: CredentialDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Composes the immutable per-client configuration.
    ///
    /// # Errors
    ///
    /// Fails fast with a configuration error when the target cannot resolve
    /// to a base URL.
    pub fn build(self) -> DomainResult<ClientConfig> {
        let base_url = self.target.resolve()?;
        let authenticator = Authenticator::new(
            self.username.as_deref(),
            self.password.as_deref(),
            self.token.as_deref(),
            &self.defaults,
        );
        let headers = self
            .headers
            .unwrap_or_else(HeaderMap::api_defaults)
            .with_authorization(&authenticator);
        Ok(ClientConfig {
            base_url,
            headers,
            authenticator,
        })
    }
}

/// Immutable per-client configuration, computed once at construction and
/// never recomputed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    base_url: BaseUrl,
    headers: HeaderMap,
    #[serde(skip, default)]
    authenticator: Authenticator,
}

impl ClientConfig {
    /// Returns the canonical origin.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the composed default headers (authorization included).
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the resolved authenticator.
    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::DomainError;
    use crate::target::Protocol;

    #[test]
    fn test_build_composes_once() {
        let config = ClientOptions::new(
            TargetSpec::from_host("api.example.com").with_protocol(Protocol::Https),
        )
        .with_basic("user", "pass")
        .build()
        .unwrap();

        assert_eq!(config.base_url().as_str(), "https://api.example.com");
        assert!(config.headers().contains("Authorization"));
        assert_eq!(config.headers().get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_build_without_target_fails_fast() {
        let err = ClientOptions::default().build().unwrap_err();
        assert_eq!(err, DomainError::MissingTarget);
    }

    #[test]
    fn test_caller_headers_replace_defaults() {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", "text/xml");
        let config = ClientOptions::new(TargetSpec::from_host("h"))
            .with_headers(headers)
            .build()
            .unwrap();
        assert_eq!(config.headers().get("Accept"), Some("text/xml"));
        assert!(!config.headers().contains("User-Agent"));
    }

    #[test]
    fn test_fallback_credentials_apply() {
        let defaults = CredentialDefaults {
            token: Some("env-token".to_string()),
            ..CredentialDefaults::default()
        };
        let config = ClientOptions::new(TargetSpec::from_host("h"))
            .with_credential_defaults(defaults)
            .build()
            .unwrap();
        assert_eq!(
            config.headers().get("Authorization"),
            Some("Bearer env-token")
        );
    }
}
