//! Header map composition.
//!
//! Authorization injection works on a private copy, never on a caller-owned
//! map. Precedence: a caller-supplied `Authorization` header suppresses
//! Basic injection, while a configured Bearer token always wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::credentials::Authenticator;

/// Header name used for credential injection.
pub const AUTHORIZATION: &str = "Authorization";

/// Default User-Agent attached to every request.
pub const DEFAULT_USER_AGENT: &str = "surge-http-client";

/// An ordered map of HTTP header names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap {
    entries: BTreeMap<String, String>,
}

impl HeaderMap {
    /// Creates an empty header map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns the default API header set.
    #[must_use]
    pub fn api_defaults() -> Self {
        let mut headers = Self::new();
        headers.insert("Content-Type", "application/json");
        headers.insert("User-Agent", DEFAULT_USER_AGENT);
        headers.insert("Cache-Control", "no-cache, no-store, must-revalidate");
        headers.insert("Pragma", "no-cache");
        headers
    }

    /// Inserts a header, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Returns the value for `name`, matching case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when a header with `name` exists (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Replaces any case-variant of `name` with a single canonical entry.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.entries.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.entries.insert(name.to_string(), value.into());
    }

    /// Merges `other` into this map; entries in `other` win.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in &other.entries {
            self.set(name, value.clone());
        }
    }

    /// Iterates over name/value pairs in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // BTreeMap::len is not const
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // BTreeMap::is_empty is not const
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy with an `Authorization` header merged in from the
    /// authenticator.
    ///
    /// Basic material is only injected when the caller did not supply an
    /// `Authorization` header of their own; a Bearer token overrides either.
    #[must_use]
    pub fn with_authorization(&self, authenticator: &Authenticator) -> Self {
        let mut composed = self.clone();
        if let Some(basic) = authenticator.basic_credential() {
            if !composed.contains(AUTHORIZATION) {
                composed.set(AUTHORIZATION, format!("Basic {basic}"));
            }
        }
        if let Some(token) = authenticator.bearer_credential() {
            composed.set(AUTHORIZATION, format!("Bearer {token}"));
        }
        composed
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
