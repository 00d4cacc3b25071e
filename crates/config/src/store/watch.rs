//! Native file-change notification for the loaded config file.
//!
//! Invariants:
//! - The watcher observes the config file's directory so editors that replace
//!   the file (write-to-temp then rename) keep being observed.
//! - Every event touching the config file, of any kind, triggers one reload
//!   followed by one `on_config_change` callback.
//! - The watcher holds only a weak reference to the store.

use notify::{Event, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, Weak};
use tracing::{debug, warn};

use super::{Inner, Store, WatchHandler};
use crate::error::{ConfigError, Result};

impl Store {
    /// Start watching the file loaded by `read_in_config`.
    ///
    /// Replaces any previous watcher on this store.
    pub fn watch_config(&self) -> Result<()> {
        let file = self.config_file_used().ok_or_else(|| ConfigError::WatchSetup {
            path: PathBuf::new(),
            message: "no config file has been loaded".to_string(),
        })?;

        let target = std::fs::canonicalize(&file).map_err(|e| ConfigError::WatchSetup {
            path: file.clone(),
            message: e.to_string(),
        })?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::WatchSetup {
                path: file.clone(),
                message: "config file has no parent directory".to_string(),
            })?;

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let watched = target.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !event.paths.iter().any(|p| p == &watched) {
                    return;
                }
                if let Some(inner) = weak.upgrade() {
                    debug!(kind = ?event.kind, path = %watched.display(), "config file changed");
                    Store { inner }.handle_file_change();
                }
            }
            Err(e) => warn!(error = %e, "config file watcher error"),
        })
        .map_err(|e| ConfigError::WatchSetup {
            path: file.clone(),
            message: e.to_string(),
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchSetup {
                path: file.clone(),
                message: e.to_string(),
            })?;

        *self
            .inner
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(watcher);
        debug!(path = %target.display(), "watching config file");
        Ok(())
    }

    /// Callback run after each reload triggered by the file watcher.
    pub fn on_config_change<F>(&self, handler: F)
    where
        F: Fn(&Store) + Send + Sync + 'static,
    {
        self.set_change_handler(Arc::new(handler));
    }

    pub(crate) fn set_change_handler(&self, handler: WatchHandler) {
        *self
            .inner
            .on_change
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// Stop watching the config file. No-op if not watching.
    pub fn unwatch(&self) {
        self.inner
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// True while a file watcher is armed.
    pub fn is_watching(&self) -> bool {
        self.inner
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn handle_file_change(&self) {
        if let Err(e) = self.read_in_config() {
            warn!(error = %e, "failed to reload config file; keeping previous values");
        }

        let handler = self
            .inner
            .on_change
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(handler) = handler {
            handler(self);
        }
    }
}
