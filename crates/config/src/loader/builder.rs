//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Hold what a build needs beyond `Options`: the `Defaults`, the HTTP client,
//!   backend overrides, the remote poll interval, and the cancellation token.
//! - Resolve the source kind and dispatch to the matching loader.
//!
//! Invariants / Assumptions:
//! - Options values take precedence over `Defaults`, which take precedence
//!   over hardcoded fallbacks (see `options.rs`).
//! - Unknown providers load from a file, exactly as an empty provider does.

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{content, env, file, remote};
use crate::cancellation::CancellationToken;
use crate::constants::DEFAULT_REMOTE_POLL_INTERVAL;
use crate::defaults::Defaults;
use crate::error::Result;
use crate::options::{Options, SourceKind};
use crate::remote::{Provider, RemoteBackend};
use crate::store::Store;

/// Builds stores from `Options`, falling back to a borrowed `Defaults`.
pub struct ConfigLoader<'a> {
    defaults: &'a Defaults,
    client: Option<Client>,
    backends: HashMap<Provider, Arc<dyn RemoteBackend>>,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl<'a> ConfigLoader<'a> {
    /// Create a loader reading fallbacks from `defaults`.
    pub fn new(defaults: &'a Defaults) -> Self {
        Self {
            defaults,
            client: None,
            backends: HashMap::new(),
            poll_interval: DEFAULT_REMOTE_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `backend` instead of the built-in HTTP backend for `provider`.
    ///
    /// The endpoint in `Options` is ignored for overridden providers.
    pub fn with_remote_backend(
        mut self,
        provider: Provider,
        backend: Arc<dyn RemoteBackend>,
    ) -> Self {
        self.backends.insert(provider, backend);
        self
    }

    /// HTTP client shared by the built-in remote backends.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Delay between remote re-reads when watching.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Token that stops remote polling tasks spawned by this loader.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Clone of the token that stops this loader's polling tasks.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn defaults(&self) -> &Defaults {
        self.defaults
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Backend for `provider`: an override if registered, else the built-in one.
    pub(crate) fn backend_for(
        &self,
        provider: Provider,
        endpoint: &str,
    ) -> Result<Arc<dyn RemoteBackend>> {
        if let Some(backend) = self.backends.get(&provider) {
            return Ok(Arc::clone(backend));
        }
        let client = self.client.clone().unwrap_or_default();
        provider.backend(endpoint, client)
    }

    /// Resolve the source, load it into a fresh store, and apply the env overlay.
    pub async fn build(&self, options: Option<Options>) -> Result<Store> {
        let options = options.unwrap_or_default();
        let store = Store::new();

        let kind = options.source_kind();
        if kind == SourceKind::File
            && !options.effective_provider().is_empty()
            && !options.effective_provider().eq_ignore_ascii_case("file")
        {
            debug!(
                provider = options.effective_provider(),
                "unrecognized provider; loading from file"
            );
        }

        match kind {
            SourceKind::File => file::load(self, &store, &options)?,
            SourceKind::Content => content::load(self, &store, &options)?,
            SourceKind::Remote(provider) => {
                remote::load(self, &store, &options, provider).await?
            }
        }

        env::apply(self, &store, &options);
        debug!(source = ?kind, file = ?store.config_file_used(), "configuration loaded");
        Ok(store)
    }
}

/// Build a store from `options` with a default loader over `defaults`.
pub async fn build(defaults: &Defaults, options: Option<Options>) -> Result<Store> {
    ConfigLoader::new(defaults).build(options).await
}
