//! Unified configuration loading.
//!
//! This crate resolves configuration from local files, inline content, or a
//! remote key-value store (etcd, Consul, Firestore) into a [`Store`], with an
//! optional environment-variable overlay and change watching. Per-call
//! [`Options`] fall back to a shared [`Defaults`] registry.

pub mod cancellation;
pub mod constants;
mod defaults;
pub mod encryption;
mod error;
mod format;
mod loader;
mod options;
pub mod remote;
mod store;

pub use cancellation::CancellationToken;
pub use defaults::Defaults;
pub use encryption::{EncryptionError, open, seal};
pub use error::{ConfigError, Result};
pub use format::ConfigFormat;
pub use loader::{ConfigLoader, build};
pub use options::{Options, SourceKind};
pub use remote::{
    ConsulBackend, EtcdBackend, FirestoreBackend, Provider, RemoteBackend, RemoteError,
};
pub use store::{Store, WatchHandler, env_var_or_none};

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{Mutex, OnceLock};

    pub fn global_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    /// Route `tracing` output to the test harness; filter with `RUST_LOG`.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
