//! Change watching for loaded stores.
//!
//! Responsibilities:
//! - Arm the store's native file watcher and attach the effective handler.
//! - Run the remote polling task: sleep, re-read, notify, forever.
//!
//! Invariants:
//! - File changes invoke the handler once per event touching the file.
//! - A failed remote re-read is logged and never reaches the handler.
//! - The polling interval is fixed; there is no backoff on repeated failures.
//! - Polling stops only when its cancellation token is cancelled.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cancellation::CancellationToken;
use crate::error::Result;
use crate::store::{Store, WatchHandler};

/// Install `handler`, then start the watcher, so no event can miss it.
pub(super) fn arm_file_watch(store: &Store, handler: Option<WatchHandler>) -> Result<()> {
    if let Some(handler) = handler {
        store.set_change_handler(handler);
    }
    store.watch_config()
}

pub(super) fn spawn_remote_watch(
    store: Store,
    handler: Option<WatchHandler>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(?interval, "remote config polling started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            if let Err(e) = store.watch_remote_config().await {
                warn!(error = %e, "unable to read remote config");
                continue;
            }
            if let Some(handler) = &handler {
                handler(&store);
            }
        }
        debug!("remote config polling stopped");
    })
}
