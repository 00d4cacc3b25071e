//! Fallback values shared by every build.
//!
//! Responsibilities:
//! - Hold the fallbacks consulted when per-call `Options` leave a field empty.
//! - Enforce first-writer-wins: a field, once set, ignores further setters.
//! - Provide `reset()` for test isolation.
//!
//! Does NOT handle:
//! - Applying the hardcoded fallbacks (`config`, `yaml`, cwd); see `Options`.
//!
//! Invariants:
//! - Setting an empty value is a no-op; the field stays unset.
//! - Only `reset()` can change a field that has been set.
//! - Setters take `&mut self`, so all setting happens before the value is
//!   shared with concurrent builds.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::trace;

use crate::store::{Store, WatchHandler};

/// Default registry for configuration resolution.
#[derive(Clone, Default)]
pub struct Defaults {
    env_file_key: Option<String>,
    config_name: Option<String>,
    config_type: Option<String>,
    config_file: Option<String>,
    search_path: Vec<PathBuf>,
    env_prefix: Option<String>,
    watch_handler: Option<WatchHandler>,
}

/// Write a non-empty `value` into an unset slot.
fn set_once(slot: &mut Option<String>, value: impl Into<String>, field: &'static str) {
    let value = value.into();
    if value.is_empty() {
        return;
    }
    if slot.is_some() {
        trace!(field, "default already set; ignoring");
        return;
    }
    *slot = Some(value);
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of an env var whose value is the config file path.
    pub fn set_env_file_key(&mut self, key: impl Into<String>) {
        set_once(&mut self.env_file_key, key, "env_file_key");
    }

    pub fn set_config_name(&mut self, name: impl Into<String>) {
        set_once(&mut self.config_name, name, "config_name");
    }

    pub fn set_config_type(&mut self, config_type: impl Into<String>) {
        set_once(&mut self.config_type, config_type, "config_type");
    }

    pub fn set_config_file(&mut self, file: impl Into<String>) {
        set_once(&mut self.config_file, file, "config_file");
    }

    /// Directories scanned in order for `<name>.<type>`.
    pub fn set_search_path<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        if !self.search_path.is_empty() {
            trace!(field = "search_path", "default already set; ignoring");
            return;
        }
        self.search_path = paths.into_iter().map(Into::into).collect();
    }

    pub fn set_env_prefix(&mut self, prefix: impl Into<String>) {
        set_once(&mut self.env_prefix, prefix, "env_prefix");
    }

    /// Callback used when a watched build has no handler of its own.
    pub fn set_watch_handler<F>(&mut self, handler: F)
    where
        F: Fn(&Store) + Send + Sync + 'static,
    {
        self.set_watch_handler_arc(Arc::new(handler));
    }

    pub fn set_watch_handler_arc(&mut self, handler: WatchHandler) {
        if self.watch_handler.is_some() {
            trace!(field = "watch_handler", "default already set; ignoring");
            return;
        }
        self.watch_handler = Some(handler);
    }

    /// Apply every field of `other` through the first-writer-wins setters.
    pub fn merge(&mut self, other: Defaults) {
        if let Some(v) = other.env_file_key {
            self.set_env_file_key(v);
        }
        if let Some(v) = other.config_name {
            self.set_config_name(v);
        }
        if let Some(v) = other.config_type {
            self.set_config_type(v);
        }
        if let Some(v) = other.config_file {
            self.set_config_file(v);
        }
        self.set_search_path(other.search_path);
        if let Some(v) = other.env_prefix {
            self.set_env_prefix(v);
        }
        if let Some(v) = other.watch_handler {
            self.set_watch_handler_arc(v);
        }
    }

    /// Clear every field, and the env var named by `env_file_key`.
    ///
    /// # Safety
    ///
    /// Removes a process environment variable. The caller must ensure no
    /// other thread reads or writes the environment during the call, exactly
    /// as for [`std::env::remove_var`].
    pub unsafe fn reset(&mut self) {
        if let Some(key) = self.env_file_key.take() {
            // SAFETY: forwarded to the caller per this function's contract.
            unsafe {
                std::env::remove_var(key);
            }
        }
        *self = Self::default();
    }

    pub fn env_file_key(&self) -> Option<&str> {
        self.env_file_key.as_deref()
    }

    pub fn config_name(&self) -> Option<&str> {
        self.config_name.as_deref()
    }

    pub fn config_type(&self) -> Option<&str> {
        self.config_type.as_deref()
    }

    pub fn config_file(&self) -> Option<&str> {
        self.config_file.as_deref()
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    pub fn watch_handler(&self) -> Option<&WatchHandler> {
        self.watch_handler.as_ref()
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Defaults")
            .field("env_file_key", &self.env_file_key)
            .field("config_name", &self.config_name)
            .field("config_type", &self.config_type)
            .field("config_file", &self.config_file)
            .field("search_path", &self.search_path)
            .field("env_prefix", &self.env_prefix)
            .field("watch_handler", &self.watch_handler.is_some())
            .finish()
    }
}
