//! Remote source: a key in etcd, Consul or Firestore.

use secrecy::SecretString;
use tracing::debug;

use super::builder::ConfigLoader;
use super::watch;
use crate::error::Result;
use crate::options::Options;
use crate::remote::Provider;
use crate::store::Store;

pub(super) async fn load(
    loader: &ConfigLoader<'_>,
    store: &Store,
    options: &Options,
    provider: Provider,
) -> Result<()> {
    let defaults = loader.defaults();
    let endpoint = options.effective_endpoint();
    // The file option names the remote key here, not a local path.
    let key = options.effective_file(defaults).unwrap_or_default();

    let backend = loader.backend_for(provider, endpoint)?;
    let secret = (!options.secret_key.is_empty())
        .then(|| SecretString::new(options.secret_key.clone().into()));
    store.add_remote_backend(backend, key.clone(), secret);
    store.set_config_type(options.effective_type(defaults));

    debug!(%provider, endpoint, key = %key, "reading remote config");
    store.read_remote_config().await?;

    if options.watch {
        watch::spawn_remote_watch(
            store.clone(),
            options.effective_watch_handler(defaults),
            loader.poll_interval(),
            loader.cancel_token().clone(),
        );
    }
    Ok(())
}
