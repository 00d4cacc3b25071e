//! Environment variable lookup for the store's automatic env overlay.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Key `a.b` with prefix `app` maps to `APP_A_B`.

use crate::constants::{ENV_KEY_SEPARATOR, ENV_PREFIX_SEPARATOR};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Name of the environment variable that backs a config key.
pub(crate) fn env_key(prefix: Option<&str>, key: &str) -> String {
    let key = key.replace('.', ENV_KEY_SEPARATOR);
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}{}{}", prefix, ENV_PREFIX_SEPARATOR, key).to_uppercase(),
        None => key.to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_env_key_mapping() {
        assert_eq!(env_key(None, "demo"), "DEMO");
        assert_eq!(env_key(Some("my"), "test.title"), "MY_TEST_TITLE");
        assert_eq!(env_key(Some(""), "port"), "PORT");
    }

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_empty_and_whitespace_strings() {
        let key = "_UNICONF_TEST_ENV_VAR";
        assert!(env_var_or_none(key).is_none(), "Unset env var should return None");

        temp_env::with_vars([(key, Some(""))], || {
            assert!(env_var_or_none(key).is_none());
        });

        temp_env::with_vars([(key, Some("   "))], || {
            assert!(env_var_or_none(key).is_none());
        });

        temp_env::with_vars([(key, Some(" value "))], || {
            assert_eq!(env_var_or_none(key), Some("value".to_string()));
        });
    }
}
