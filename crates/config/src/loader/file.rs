//! File source: an explicit path, or a name/type scan over the search path.

use tracing::debug;

use super::builder::ConfigLoader;
use super::watch;
use crate::error::Result;
use crate::options::Options;
use crate::store::Store;

pub(super) fn load(loader: &ConfigLoader<'_>, store: &Store, options: &Options) -> Result<()> {
    let defaults = loader.defaults();

    match options.effective_file(defaults) {
        Some(file) => {
            debug!(file = %file, "loading explicit config file");
            store.set_config_file(file);
            // Consulted only when the file has no recognizable extension.
            store.set_config_type(options.effective_type(defaults));
        }
        None => {
            let search_path = options.effective_search_path(defaults);
            debug!(?search_path, "searching for config file");
            for dir in search_path {
                store.add_config_path(dir);
            }
            store.set_config_name(options.effective_name(defaults));
            store.set_config_type(options.effective_type(defaults));
        }
    }

    store.read_in_config()?;

    if options.watch {
        watch::arm_file_watch(store, options.effective_watch_handler(defaults))?;
    }
    Ok(())
}
