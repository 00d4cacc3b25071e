//! Content source: `Options::file` holds the configuration text itself.

use tracing::debug;

use super::builder::ConfigLoader;
use crate::error::Result;
use crate::options::Options;
use crate::store::Store;

pub(super) fn load(loader: &ConfigLoader<'_>, store: &Store, options: &Options) -> Result<()> {
    store.set_config_type(options.effective_type(loader.defaults()));
    store.merge_config(&options.file)?;

    // There is no file to observe.
    if options.watch {
        debug!("watch requested for inline content; ignoring");
    }
    Ok(())
}
