//! Remote source registration and reads.

use reqwest::Client;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

use super::Store;
use crate::encryption;
use crate::error::{ConfigError, Result};
use crate::format::ConfigFormat;
use crate::remote::{Provider, RemoteBackend};

/// The remote key a store reads from, and how.
#[derive(Clone)]
pub(crate) struct RemoteSource {
    backend: Arc<dyn RemoteBackend>,
    path: String,
    secret: Option<Arc<SecretString>>,
}

impl Store {
    /// Register a built-in backend for `provider` reading `path` at `endpoint`.
    pub fn add_remote_provider(&self, provider: &str, endpoint: &str, path: &str) -> Result<()> {
        let backend = provider.parse::<Provider>()?.backend(endpoint, Client::new())?;
        self.add_remote_backend(backend, path, None);
        Ok(())
    }

    /// Like [`Store::add_remote_provider`], but payloads are sealed with `secret`.
    pub fn add_secure_remote_provider(
        &self,
        provider: &str,
        endpoint: &str,
        path: &str,
        secret: SecretString,
    ) -> Result<()> {
        let backend = provider.parse::<Provider>()?.backend(endpoint, Client::new())?;
        self.add_remote_backend(backend, path, Some(secret));
        Ok(())
    }

    /// Register an arbitrary backend. A `secret` makes reads open sealed payloads.
    pub fn add_remote_backend(
        &self,
        backend: Arc<dyn RemoteBackend>,
        path: impl Into<String>,
        secret: Option<SecretString>,
    ) {
        let path = path.into();
        debug!(
            provider = backend.provider(),
            endpoint = backend.endpoint(),
            path = %path,
            secure = secret.is_some(),
            "registered remote provider"
        );
        self.state_mut().remote = Some(RemoteSource {
            backend,
            path,
            secret: secret.map(Arc::new),
        });
    }

    /// Fetch the registered remote key once and replace loaded values.
    pub async fn read_remote_config(&self) -> Result<()> {
        let source = self
            .state()
            .remote
            .clone()
            .ok_or(ConfigError::NoRemoteProvider)?;
        let format = self.remote_format(&source.path)?;

        let payload = source
            .backend
            .get(&source.path)
            .await
            .map_err(|e| ConfigError::RemoteUnavailable {
                provider: source.backend.provider().to_string(),
                endpoint: source.backend.endpoint().to_string(),
                source: e,
            })?;

        let payload = match &source.secret {
            Some(secret) => encryption::open(&payload, secret)?,
            None => payload,
        };

        let origin = format!("{}:{}", source.backend.provider(), source.path);
        let text = String::from_utf8(payload).map_err(|e| ConfigError::Parse {
            origin: origin.clone(),
            format,
            message: e.to_string(),
        })?;
        let parsed = format.parse(&text).map_err(|message| ConfigError::Parse {
            origin,
            format,
            message,
        })?;

        self.replace_config(parsed);
        Ok(())
    }

    /// Re-read the remote key; used by the polling watcher.
    pub async fn watch_remote_config(&self) -> Result<()> {
        self.read_remote_config().await
    }

    fn remote_format(&self, path: &str) -> Result<ConfigFormat> {
        if self.state().config_type.is_some() {
            return self.configured_format();
        }
        ConfigFormat::from_path(std::path::Path::new(path))
            .ok_or_else(|| ConfigError::UnsupportedConfigType(String::new()))
    }
}
