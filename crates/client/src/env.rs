//! Environment-sourced credential defaults.
//!
//! The process environment is read once, here, and the snapshot injected
//! into [`surge_domain::ClientOptions`]; nothing else in the workspace
//! touches environment variables.

use surge_domain::CredentialDefaults;

/// Names of the credential environment variables. The defaults match the
/// conventional `API_*` set; deployments with different naming inject their
/// own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvNames {
    /// Variable holding the basic-auth username.
    pub username: String,
    /// Variable holding the basic-auth password.
    pub password: String,
    /// Variable holding the bearer token.
    pub token: String,
}

impl Default for EnvNames {
    fn default() -> Self {
        Self {
            username: "API_USERNAME".to_string(),
            password: "API_PASSWORD".to_string(),
            token: "API_TOKEN".to_string(),
        }
    }
}

/// Reads credential fallbacks from the conventional `API_*` variables.
#[must_use]
pub fn credentials_from_env() -> CredentialDefaults {
    credentials_from_env_with(&EnvNames::default())
}

/// Reads credential fallbacks from explicitly named variables.
#[must_use]
pub fn credentials_from_env_with(names: &EnvNames) -> CredentialDefaults {
    credentials_from_lookup(names, |name| std::env::var(name).ok())
}

/// Resolves credential fallbacks through an arbitrary variable lookup.
///
/// Absent or empty variables simply yield no fallback for that scheme; an
/// entirely unauthenticated run is valid and noted at debug level only.
pub fn credentials_from_lookup(
    names: &EnvNames,
    lookup: impl Fn(&str) -> Option<String>,
) -> CredentialDefaults {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let defaults = CredentialDefaults {
        username: read(&names.username),
        password: read(&names.password),
        token: read(&names.token),
    };
    if defaults.username.is_none() && defaults.password.is_none() && defaults.token.is_none() {
        tracing::debug!("no credential variables set; requests go unauthenticated");
    }
    defaults
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_reads_named_variables() {
        let names = EnvNames::default();
        let defaults = credentials_from_lookup(&names, |name| match name {
            "API_USERNAME" => Some("user".to_string()),
            "API_PASSWORD" => Some("pass".to_string()),
            _ => None,
        });
        assert_eq!(defaults.username.as_deref(), Some("user"));
        assert_eq!(defaults.password.as_deref(), Some("pass"));
        assert_eq!(defaults.token, None);
    }

    #[test]
    fn test_empty_variables_count_as_absent() {
        let defaults = credentials_from_lookup(&EnvNames::default(), |_| Some(String::new()));
        assert_eq!(defaults.username, None);
        assert_eq!(defaults.password, None);
        assert_eq!(defaults.token, None);
    }

    #[test]
    fn test_custom_names() {
        let names = EnvNames {
            username: "SVC_USER".to_string(),
            password: "SVC_PASS".to_string(),
            token: "SVC_TOKEN".to_string(),
        };
        let defaults = credentials_from_lookup(&names, |name| {
            (name == "SVC_TOKEN").then(|| "tok".to_string())
        });
        assert_eq!(defaults.token.as_deref(), Some("tok"));
        assert_eq!(defaults.username, None);
    }
}
