//! HTTP verb recognition.
//!
//! The verb set doubles as the terminal-name set for the fluent request
//! chain: a chained name parsing as a verb ends the chain. Extending the
//! set means adding a variant here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Recognized HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    /// HTTP GET
    #[default]
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
}

impl HttpVerb {
    /// Returns all recognized verbs.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Get, Self::Post, Self::Put]
    }

    /// Returns the verb as an uppercase static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }

    /// Returns whether this verb typically carries a request body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            other => Err(DomainError::UnsupportedVerb(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_verb_from_str() {
        assert_eq!("get".parse::<HttpVerb>().unwrap(), HttpVerb::Get);
        assert_eq!("POST".parse::<HttpVerb>().unwrap(), HttpVerb::Post);
        assert_eq!("Put".parse::<HttpVerb>().unwrap(), HttpVerb::Put);
    }

    #[test]
    fn test_unrecognized_name_is_not_a_verb() {
        assert!("breeds".parse::<HttpVerb>().is_err());
        assert!("delete".parse::<HttpVerb>().is_err());
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(HttpVerb::Get.to_string(), "GET");
        assert_eq!(HttpVerb::Put.to_string(), "PUT");
    }

    #[test]
    fn test_has_body() {
        assert!(!HttpVerb::Get.has_body());
        assert!(HttpVerb::Post.has_body());
        assert!(HttpVerb::Put.has_body());
    }
}
