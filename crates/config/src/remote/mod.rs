//! Remote key-value backends.
//!
//! Responsibilities:
//! - Define the `RemoteBackend` trait the store reads remote payloads through.
//! - Provide HTTP implementations for etcd, Consul and Firestore.
//! - Name the supported remote providers.
//!
//! Does NOT handle:
//! - Parsing or decrypting payloads (see `store` and `encryption`).
//! - Polling for changes (see `loader::watch`).
//!
//! Invariants:
//! - A backend returns the raw stored bytes for a key, unmodified.
//! - A missing key is reported as `RemoteError::KeyNotFound`, never as empty bytes.

mod consul;
mod etcd;
mod firestore;

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::error::ConfigError;

pub use consul::ConsulBackend;
pub use etcd::EtcdBackend;
pub use firestore::FirestoreBackend;

/// Errors returned by remote backends.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The key does not exist in the backend.
    #[error("key \"{0}\" not found")]
    KeyNotFound(String),

    /// The backend answered with a body that could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The endpoint is not a usable base URL.
    #[error("invalid endpoint \"{0}\"")]
    InvalidEndpoint(String),

    /// Custom backends may fail for reasons of their own.
    #[error("{0}")]
    Other(String),
}

/// A remote key-value store holding configuration payloads.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Provider name used in logs and errors.
    fn provider(&self) -> &str;

    /// Endpoint the backend talks to.
    fn endpoint(&self) -> &str;

    /// Fetch the raw value stored at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, RemoteError>;
}

/// Remote key-value providers with a built-in backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Etcd,
    Consul,
    Firestore,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Self::Etcd => "etcd",
            Self::Consul => "consul",
            Self::Firestore => "firestore",
        }
    }

    /// Construct the built-in HTTP backend for this provider.
    pub fn backend(
        self,
        endpoint: &str,
        client: Client,
    ) -> Result<Arc<dyn RemoteBackend>, ConfigError> {
        let base = parse_endpoint(endpoint).map_err(|source| ConfigError::RemoteUnavailable {
            provider: self.name().to_string(),
            endpoint: endpoint.to_string(),
            source,
        })?;

        Ok(match self {
            Self::Etcd => Arc::new(EtcdBackend::new(client, base)),
            Self::Consul => Arc::new(ConsulBackend::new(client, base)),
            Self::Firestore => Arc::new(FirestoreBackend::new(client, base)),
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "etcd" => Ok(Self::Etcd),
            "consul" => Ok(Self::Consul),
            "firestore" => Ok(Self::Firestore),
            _ => Err(ConfigError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Validate an endpoint and strip any trailing slash.
fn parse_endpoint(endpoint: &str) -> Result<String, RemoteError> {
    let trimmed = endpoint.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(trimmed.trim_end_matches('/').to_string())
        }
        _ => Err(RemoteError::InvalidEndpoint(endpoint.to_string())),
    }
}

/// Map non-success statuses to errors; 404 means the key is absent.
fn check_status(response: Response, key: &str) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(RemoteError::KeyNotFound(key.to_string()));
    }
    Err(RemoteError::Status {
        status: status.as_u16(),
        url: response.url().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_case_insensitive() {
        assert_eq!("ETCD".parse::<Provider>().unwrap(), Provider::Etcd);
        assert_eq!(" consul ".parse::<Provider>().unwrap(), Provider::Consul);
        assert_eq!("Firestore".parse::<Provider>().unwrap(), Provider::Firestore);
        assert!(matches!(
            "zookeeper".parse::<Provider>(),
            Err(ConfigError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn test_endpoint_validation() {
        assert_eq!(
            parse_endpoint("http://127.0.0.1:2379/").unwrap(),
            "http://127.0.0.1:2379"
        );
        assert!(matches!(
            parse_endpoint("127.0.0.1:2379"),
            Err(RemoteError::InvalidEndpoint(_))
        ));
        assert!(parse_endpoint("").is_err());
    }

    #[test]
    fn test_backend_rejects_bad_endpoint() {
        let result = Provider::Consul.backend("not a url", Client::new());
        assert!(matches!(
            result,
            Err(ConfigError::RemoteUnavailable { ref provider, .. }) if provider == "consul"
        ));
    }
}
