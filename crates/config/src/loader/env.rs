//! Environment overlay applied after a successful load.

use super::builder::ConfigLoader;
use crate::options::Options;
use crate::store::Store;

/// Enable automatic env lookup when `Options::env` is set. Never fails.
pub(super) fn apply(loader: &ConfigLoader<'_>, store: &Store, options: &Options) {
    if !options.env {
        return;
    }
    store.automatic_env();
    if let Some(prefix) = options.effective_env_prefix(loader.defaults()) {
        store.set_env_prefix(prefix);
    }
}
