//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for every way a build can fail.
//! - Carry enough context (paths, provider, endpoint) to debug a failure.
//!
//! Does NOT handle:
//! - Errors inside the remote polling loop (logged there, never surfaced).
//! - Encryption internals (see `encryption.rs`, converted via `From`).
//!
//! Invariants:
//! - Loader errors reach the caller of `build()` as produced, without retries.
//! - Error messages never include secret keys or decrypted payloads.

use std::path::PathBuf;
use thiserror::Error;

use crate::encryption::EncryptionError;
use crate::format::ConfigFormat;
use crate::remote::RemoteError;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while resolving or loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No matching config file exists in any searched location.
    #[error("Config file \"{name}\" not found in {}", display_paths(.searched))]
    ConfigNotFound { name: String, searched: Vec<PathBuf> },

    /// Content was found but is malformed for the declared format.
    #[error("Failed to parse {origin} as {format}: {message}")]
    Parse {
        origin: String,
        format: ConfigFormat,
        message: String,
    },

    /// The config type (or file extension) is not a supported format.
    #[error("Unsupported config type \"{0}\"")]
    UnsupportedConfigType(String),

    /// Registration with, or the initial read from, a remote backend failed.
    #[error("Remote {provider} at {endpoint} unavailable: {source}")]
    RemoteUnavailable {
        provider: String,
        endpoint: String,
        #[source]
        source: RemoteError,
    },

    /// The provider name does not denote a remote backend.
    #[error("Unsupported remote provider \"{0}\"")]
    UnsupportedProvider(String),

    /// No remote backend has been registered on the store.
    #[error("No remote provider registered")]
    NoRemoteProvider,

    /// A secured remote payload could not be opened with the secret key.
    #[error("Failed to decrypt remote configuration: {0}")]
    Decryption(#[from] EncryptionError),

    /// The native file-change notifier could not be armed.
    #[error("Failed to watch config file {path}: {message}")]
    WatchSetup { path: PathBuf, message: String },

    /// Reading a located config file failed for a reason other than absence.
    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Resolved settings could not be deserialized into the requested type.
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl ConfigError {
    /// True if this error means no configuration source was found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConfigNotFound { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    let joined = paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_searched_paths() {
        let err = ConfigError::ConfigNotFound {
            name: "config.yaml".to_string(),
            searched: vec![PathBuf::from("/etc/app"), PathBuf::from("/srv/app")],
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Config file \"config.yaml\" not found in [/etc/app, /srv/app]"
        );
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = ConfigError::Parse {
            origin: "inline content".to_string(),
            format: ConfigFormat::Toml,
            message: "expected `=`".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("as toml"));
    }
}
