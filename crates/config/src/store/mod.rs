//! The configuration value store.
//!
//! Responsibilities:
//! - Hold resolved configuration as a tree of values with typed getters.
//! - Locate and read config files (explicit file or name/type/search-path scan).
//! - Merge inline configuration text.
//! - Overlay environment variables when automatic env lookup is enabled.
//! - Read remote payloads (see `remote.rs`) and watch local files (see `watch.rs`).
//!
//! Does NOT handle:
//! - Deciding which source to use; that is the loader's precedence engine.
//! - Polling remote sources on a schedule (see `loader::watch`).
//!
//! Invariants:
//! - `Store` is a handle: clones share the same live state.
//! - Keys are case-insensitive and dotted (`owner.name`).
//! - Lookup order is explicit `set` > environment > loaded config > `set_default`.
//! - A failed read leaves previously loaded values untouched.

mod env;
mod remote;
mod value;
mod watch;

use notify::RecommendedWatcher;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::constants::DEFAULT_CONFIG_NAME;
use crate::error::{ConfigError, Result};
use crate::format::{ConfigFormat, fold_keys};

pub use env::env_var_or_none;
pub(crate) use remote::RemoteSource;

/// Callback invoked with the live store after a detected change.
pub type WatchHandler = Arc<dyn Fn(&Store) + Send + Sync>;

/// Shared, thread-safe configuration container.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    state: RwLock<State>,
    watcher: Mutex<Option<RecommendedWatcher>>,
    on_change: RwLock<Option<WatchHandler>>,
}

struct State {
    config: Map<String, Value>,
    overrides: Map<String, Value>,
    defaults: Map<String, Value>,
    config_file: Option<PathBuf>,
    config_name: String,
    config_type: Option<String>,
    config_paths: Vec<PathBuf>,
    config_file_used: Option<PathBuf>,
    automatic_env: bool,
    env_prefix: Option<String>,
    remote: Option<RemoteSource>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        let state = State {
            config: Map::new(),
            overrides: Map::new(),
            defaults: Map::new(),
            config_file: None,
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            config_type: None,
            config_paths: Vec::new(),
            config_file_used: None,
            automatic_env: false,
            env_prefix: None,
            remote: None,
        };
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                watcher: Mutex::new(None),
                on_change: RwLock::new(None),
            }),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, State> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, State> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Source configuration
    // -------------------------------------------------------------------------

    /// Use exactly this file; disables the search-path scan.
    pub fn set_config_file(&self, path: impl Into<PathBuf>) {
        self.state_mut().config_file = Some(path.into());
    }

    /// Append a directory to the search path.
    pub fn add_config_path(&self, dir: impl Into<PathBuf>) {
        self.state_mut().config_paths.push(dir.into());
    }

    /// Base name (without extension) looked up in the search path.
    pub fn set_config_name(&self, name: impl Into<String>) {
        self.state_mut().config_name = name.into();
    }

    /// Format used for searching, merging text, and remote payloads.
    pub fn set_config_type(&self, config_type: impl Into<String>) {
        self.state_mut().config_type = Some(config_type.into());
    }

    /// The file the last successful `read_in_config` loaded.
    pub fn config_file_used(&self) -> Option<PathBuf> {
        self.state().config_file_used.clone()
    }

    fn configured_format(&self) -> Result<ConfigFormat> {
        match &self.state().config_type {
            Some(config_type) => config_type.parse(),
            None => Err(ConfigError::UnsupportedConfigType(String::new())),
        }
    }

    /// Extension wins when it names a known format, else the configured type.
    fn format_for(&self, path: &Path) -> Result<ConfigFormat> {
        match ConfigFormat::from_path(path) {
            Some(format) => Ok(format),
            None => self.configured_format(),
        }
    }

    /// Resolve the file to read: the explicit file, else the first match in the search path.
    fn locate(&self) -> Result<PathBuf> {
        let state = self.state();
        if let Some(file) = &state.config_file {
            return Ok(file.clone());
        }

        let formats = match &state.config_type {
            Some(config_type) => vec![config_type.parse::<ConfigFormat>()?],
            None => ConfigFormat::ALL.to_vec(),
        };

        for dir in &state.config_paths {
            for format in &formats {
                for ext in format.extensions() {
                    let candidate = dir.join(format!("{}.{}", state.config_name, ext));
                    if candidate.is_file() {
                        debug!(path = %candidate.display(), "found config file in search path");
                        return Ok(candidate);
                    }
                }
            }
        }

        let name = match &state.config_type {
            Some(config_type) => format!("{}.{}", state.config_name, config_type),
            None => state.config_name.clone(),
        };
        Err(ConfigError::ConfigNotFound {
            name,
            searched: state.config_paths.clone(),
        })
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Locate, read and parse the config file, replacing loaded values.
    pub fn read_in_config(&self) -> Result<()> {
        let file = self.locate()?;
        let format = self.format_for(&file)?;

        let text = match std::fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::ConfigNotFound {
                    name: file.display().to_string(),
                    searched: vec![file],
                });
            }
            Err(source) => return Err(ConfigError::Io { path: file, source }),
        };

        let parsed = format.parse(&text).map_err(|message| ConfigError::Parse {
            origin: file.display().to_string(),
            format,
            message,
        })?;

        let mut state = self.state_mut();
        state.config = parsed;
        state.config_file_used = Some(file.clone());
        debug!(path = %file.display(), %format, "loaded config file");
        Ok(())
    }

    /// Parse `text` with the configured type and merge it over loaded values.
    pub fn merge_config(&self, text: &str) -> Result<()> {
        let format = self.configured_format()?;
        let parsed = format.parse(text).map_err(|message| ConfigError::Parse {
            origin: "inline content".to_string(),
            format,
            message,
        })?;

        value::deep_merge(&mut self.state_mut().config, parsed);
        Ok(())
    }

    fn replace_config(&self, config: Map<String, Value>) {
        self.state_mut().config = config;
    }

    // -------------------------------------------------------------------------
    // Environment
    // -------------------------------------------------------------------------

    /// Let any key be satisfied by an environment variable.
    pub fn automatic_env(&self) {
        self.state_mut().automatic_env = true;
    }

    /// Prefix prepended (with `_`) to env var names.
    pub fn set_env_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        self.state_mut().env_prefix = (!prefix.is_empty()).then_some(prefix);
    }

    /// Env var name consulted for `key`, if automatic env is on.
    pub fn env_key_for(&self, key: &str) -> Option<String> {
        let state = self.state();
        state
            .automatic_env
            .then(|| env::env_key(state.env_prefix.as_deref(), &key.to_lowercase()))
    }

    // -------------------------------------------------------------------------
    // Explicit values
    // -------------------------------------------------------------------------

    /// Override `key`; takes precedence over every other source.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = fold_keys(value.into());
        value::insert_path(&mut self.state_mut().overrides, &key.to_lowercase(), value);
    }

    /// Fallback for `key` when no source provides it.
    pub fn set_default(&self, key: &str, value: impl Into<Value>) {
        let value = fold_keys(value.into());
        value::insert_path(&mut self.state_mut().defaults, &key.to_lowercase(), value);
    }

    // -------------------------------------------------------------------------
    // Getters
    // -------------------------------------------------------------------------

    /// Resolve `key` through overrides, environment, loaded config, and defaults.
    pub fn get(&self, key: &str) -> Option<Value> {
        let key = key.to_lowercase();
        let state = self.state();

        if let Some(v) = value::lookup(&state.overrides, &key) {
            return Some(v.clone());
        }
        if state.automatic_env
            && let Some(v) = env_var_or_none(&env::env_key(state.env_prefix.as_deref(), &key))
        {
            return Some(Value::String(v));
        }
        value::lookup(&state.config, &key)
            .or_else(|| value::lookup(&state.defaults, &key))
            .cloned()
    }

    /// True if any source provides `key`.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String value of `key`; empty when unset.
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(|v| value::to_string(&v)).unwrap_or_default()
    }

    /// Boolean value of `key`; `false` when unset or unparsable.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| value::to_bool(&v))
    }

    /// Integer value of `key`; `0` when unset or unparsable.
    pub fn get_i64(&self, key: &str) -> i64 {
        self.get(key).map(|v| value::to_i64(&v)).unwrap_or_default()
    }

    /// Float value of `key`; `0.0` when unset or unparsable.
    pub fn get_f64(&self, key: &str) -> f64 {
        self.get(key).map(|v| value::to_f64(&v)).unwrap_or_default()
    }

    /// String list value of `key`; empty when unset.
    pub fn get_string_vec(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| value::to_string_vec(&v))
            .unwrap_or_default()
    }

    /// Every known leaf key, sorted.
    pub fn all_keys(&self) -> Vec<String> {
        let state = self.state();
        let mut keys = Vec::new();
        value::leaf_keys(&state.defaults, "", &mut keys);
        value::leaf_keys(&state.config, "", &mut keys);
        value::leaf_keys(&state.overrides, "", &mut keys);
        keys.sort();
        keys.dedup();
        keys
    }

    /// Every known key resolved through `get`, as a nested object.
    pub fn all_settings(&self) -> Map<String, Value> {
        let mut settings = Map::new();
        for key in self.all_keys() {
            if let Some(v) = self.get(&key) {
                value::insert_path(&mut settings, &key, v);
            }
        }
        settings
    }

    /// Deserialize all settings into `T`.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.all_settings()))?)
    }

    /// Deserialize the value at `key` into `T`.
    pub fn unmarshal_key<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let v = self.get(key).unwrap_or(Value::Null);
        Ok(serde_json::from_value(v)?)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Store")
            .field("config_file_used", &state.config_file_used)
            .field("config_type", &state.config_type)
            .field("automatic_env", &state.automatic_env)
            .field("env_prefix", &state.env_prefix)
            .field("remote", &state.remote.is_some())
            .finish_non_exhaustive()
    }
}
