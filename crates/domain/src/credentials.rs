//! Credential resolution for request authentication.
//!
//! Explicit values win over injected defaults; missing or empty material
//! degrades to [`Credentials::None`] for that scheme rather than failing.
//! The environment read itself happens outside this crate and is handed in
//! as [`CredentialDefaults`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Resolved credential material for a single request or session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// No authentication.
    #[default]
    None,
    /// Basic authentication.
    Basic {
        /// Username half of the credential pair.
        username: String,
        /// Password half of the credential pair.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

impl Credentials {
    /// Returns true if authentication material is present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Renders the `Authorization` header value, if any.
    #[must_use]
    pub fn authorization_value(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Basic { username, password } => Some(format!(
                "Basic {}",
                BASE64.encode(format!("{username}:{password}"))
            )),
            Self::Bearer { token } => Some(format!("Bearer {token}")),
        }
    }
}

/// Fallback credential values, read once by an external collaborator
/// (typically from the process environment) and injected at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialDefaults {
    /// Fallback username.
    pub username: Option<String>,
    /// Fallback password.
    pub password: Option<String>,
    /// Fallback bearer token.
    pub token: Option<String>,
}

/// Produces Basic and Bearer credential strings from explicit values with
/// injected fallbacks.
///
/// Both accessors return `None` rather than an error when material is
/// absent; callers treat that as "no auth of this kind".
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    username: String,
    password: String,
    token: String,
}

impl Authenticator {
    /// Resolves explicit values first, then defaults; empty strings fall
    /// through to the fallback.
    #[must_use]
    pub fn new(
        username: Option<&str>,
        password: Option<&str>,
        token: Option<&str>,
        defaults: &CredentialDefaults,
    ) -> Self {
        Self {
            username: pick(username, defaults.username.as_deref()),
            password: pick(password, defaults.password.as_deref()),
            token: pick(token, defaults.token.as_deref()),
        }
    }

    /// Returns the base64 `username:password` material, or `None` when
    /// either half is missing.
    #[must_use]
    pub fn basic_credential(&self) -> Option<String> {
        if self.username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(BASE64.encode(format!("{}:{}", self.username, self.password)))
    }

    /// Returns the bearer token, or `None` when unset.
    #[must_use]
    pub fn bearer_credential(&self) -> Option<String> {
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }

    /// Returns the Basic credentials variant, degrading to
    /// [`Credentials::None`] when material is missing.
    #[must_use]
    pub fn basic(&self) -> Credentials {
        if self.username.is_empty() || self.password.is_empty() {
            Credentials::None
        } else {
            Credentials::Basic {
                username: self.username.clone(),
                password: self.password.clone(),
            }
        }
    }

    /// Returns the Bearer credentials variant, degrading to
    /// [`Credentials::None`] when no token is set.
    #[must_use]
    pub fn bearer(&self) -> Credentials {
        if self.token.is_empty() {
            Credentials::None
        } else {
            Credentials::Bearer {
                token: self.token.clone(),
            }
        }
    }
}

fn pick(explicit: Option<&str>, fallback: Option<&str>) -> String {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.filter(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}
