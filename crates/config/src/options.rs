//! Per-call build options and the field precedence rules.
//!
//! Responsibilities:
//! - Define `Options`, deserializable from the established camelCase wire names.
//! - Resolve each effective field: explicit option > `Defaults` > hardcoded fallback.
//! - Classify the provider string into a `SourceKind`.
//!
//! Does NOT handle:
//! - Reading any source (see `loader`).
//!
//! Invariants:
//! - An empty string or empty list counts as "not given" at every level.
//! - The config file is resolved as: option > env var named by
//!   `Defaults::env_file_key` > none (search mode). `Defaults::config_file`
//!   is not consulted.
//! - Unknown provider strings resolve to the file source, like an empty one.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::constants::{DEFAULT_CONFIG_NAME, DEFAULT_CONFIG_SUBDIR, DEFAULT_CONFIG_TYPE};
use crate::defaults::Defaults;
use crate::remote::Provider;
use crate::store::{Store, WatchHandler, env_var_or_none};

/// Where configuration is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Content,
    Remote(Provider),
}

impl SourceKind {
    /// Classify a provider name, case-insensitively.
    ///
    /// Anything that is neither `content` nor a remote provider is a file source.
    pub fn from_provider(provider: &str) -> Self {
        let normalized = provider.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "content" => Self::Content,
            other => other.parse().map(Self::Remote).unwrap_or(Self::File),
        }
    }
}

/// Options for a single build. Every field is optional.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// `file`, `content`, `etcd`, `consul` or `firestore`.
    pub provider: String,
    pub name: String,
    #[serde(rename = "type")]
    pub config_type: String,
    /// A path for `file`, the literal text for `content`, the key for remote providers.
    pub file: String,
    pub search_path: Vec<PathBuf>,
    pub env: bool,
    pub env_prefix: String,
    #[serde(rename = "endPoint")]
    pub endpoint: String,
    /// Non-empty selects sealed remote payloads.
    pub secret_key: String,
    pub watch: bool,
    pub is_remote: bool,
    pub remote_provider: String,
    #[serde(rename = "remote_endpoint")]
    pub remote_endpoint: String,
    #[serde(skip)]
    pub watch_handler: Option<WatchHandler>,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler invoked after watched changes.
    pub fn with_watch_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Store) + Send + Sync + 'static,
    {
        self.watch_handler = Some(Arc::new(handler));
        self
    }

    /// Provider string after applying the legacy `isRemote`/`remoteProvider` fields.
    pub fn effective_provider(&self) -> &str {
        if non_empty(&self.provider).is_none() && self.is_remote {
            return &self.remote_provider;
        }
        &self.provider
    }

    pub fn source_kind(&self) -> SourceKind {
        SourceKind::from_provider(self.effective_provider())
    }

    /// Remote endpoint, falling back to the legacy `remote_endpoint` field.
    pub fn effective_endpoint(&self) -> &str {
        non_empty(&self.endpoint).unwrap_or(&self.remote_endpoint)
    }

    pub fn effective_name(&self, defaults: &Defaults) -> String {
        non_empty(&self.name)
            .or(defaults.config_name())
            .unwrap_or(DEFAULT_CONFIG_NAME)
            .to_string()
    }

    pub fn effective_type(&self, defaults: &Defaults) -> String {
        non_empty(&self.config_type)
            .or(defaults.config_type())
            .unwrap_or(DEFAULT_CONFIG_TYPE)
            .to_string()
    }

    /// Config file path, or `None` to scan the search path.
    pub fn effective_file(&self, defaults: &Defaults) -> Option<String> {
        if let Some(file) = non_empty(&self.file) {
            return Some(file.to_string());
        }
        defaults.env_file_key().and_then(env_var_or_none)
    }

    /// Search directories; falls back to `[cwd, cwd/config]`.
    pub fn effective_search_path(&self, defaults: &Defaults) -> Vec<PathBuf> {
        if !self.search_path.is_empty() {
            return self.search_path.clone();
        }
        if !defaults.search_path().is_empty() {
            return defaults.search_path().to_vec();
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        vec![cwd.clone(), cwd.join(DEFAULT_CONFIG_SUBDIR)]
    }

    pub fn effective_env_prefix(&self, defaults: &Defaults) -> Option<String> {
        non_empty(&self.env_prefix)
            .or(defaults.env_prefix())
            .map(str::to_string)
    }

    pub fn effective_watch_handler(&self, defaults: &Defaults) -> Option<WatchHandler> {
        self.watch_handler
            .clone()
            .or_else(|| defaults.watch_handler().cloned())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = match self.source_kind() {
            SourceKind::Content => "<inline content>",
            _ => self.file.as_str(),
        };
        f.debug_struct("Options")
            .field("provider", &self.provider)
            .field("name", &self.name)
            .field("config_type", &self.config_type)
            .field("file", &file)
            .field("search_path", &self.search_path)
            .field("env", &self.env)
            .field("env_prefix", &self.env_prefix)
            .field("endpoint", &self.endpoint)
            .field(
                "secret_key",
                &if self.secret_key.is_empty() { "" } else { "***" },
            )
            .field("watch", &self.watch)
            .field("is_remote", &self.is_remote)
            .field("remote_provider", &self.remote_provider)
            .field("remote_endpoint", &self.remote_endpoint)
            .field("watch_handler", &self.watch_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_source_kind_classification() {
        assert_eq!(SourceKind::from_provider(""), SourceKind::File);
        assert_eq!(SourceKind::from_provider("file"), SourceKind::File);
        assert_eq!(SourceKind::from_provider("S3"), SourceKind::File);
        assert_eq!(SourceKind::from_provider("Content"), SourceKind::Content);
        assert_eq!(
            SourceKind::from_provider("ETCD"),
            SourceKind::Remote(Provider::Etcd)
        );
        assert_eq!(
            SourceKind::from_provider("consul"),
            SourceKind::Remote(Provider::Consul)
        );
        assert_eq!(
            SourceKind::from_provider("firestore"),
            SourceKind::Remote(Provider::Firestore)
        );
    }

    #[test]
    fn test_option_beats_default_beats_fallback() {
        let mut defaults = Defaults::new();
        let options = Options::new();
        assert_eq!(options.effective_name(&defaults), "config");
        assert_eq!(options.effective_type(&defaults), "yaml");

        defaults.set_config_name("app");
        defaults.set_config_type("yaml");
        assert_eq!(options.effective_name(&defaults), "app");

        let options = Options {
            name: "test1".to_string(),
            config_type: "toml".to_string(),
            ..Options::default()
        };
        assert_eq!(options.effective_name(&defaults), "test1");
        assert_eq!(options.effective_type(&defaults), "toml");
    }

    #[test]
    fn test_search_path_fallback_is_cwd_then_config_subdir() {
        let cwd = std::env::current_dir().unwrap();
        let paths = Options::new().effective_search_path(&Defaults::new());
        assert_eq!(paths, vec![cwd.clone(), cwd.join("config")]);

        let mut defaults = Defaults::new();
        defaults.set_search_path(["/etc/app"]);
        assert_eq!(
            Options::new().effective_search_path(&defaults),
            vec![PathBuf::from("/etc/app")]
        );

        let options = Options {
            search_path: vec![PathBuf::from("/opt/app")],
            ..Options::default()
        };
        assert_eq!(
            options.effective_search_path(&defaults),
            vec![PathBuf::from("/opt/app")]
        );
    }

    #[test]
    #[serial]
    fn test_file_precedence() {
        let key = "_UNICONF_TEST_CONFIG_FILE";
        let mut defaults = Defaults::new();
        defaults.set_env_file_key(key);
        defaults.set_config_file("/from/defaults.yaml");

        temp_env::with_vars([(key, Some("/from/env.yaml"))], || {
            assert_eq!(
                Options::new().effective_file(&defaults).as_deref(),
                Some("/from/env.yaml")
            );
            let explicit = Options {
                file: "/from/option.yaml".to_string(),
                ..Options::default()
            };
            assert_eq!(
                explicit.effective_file(&defaults).as_deref(),
                Some("/from/option.yaml")
            );
        });

        temp_env::with_vars([(key, None::<&str>)], || {
            assert_eq!(Options::new().effective_file(&defaults), None);
            assert_eq!(Options::new().effective_file(&Defaults::new()), None);
        });
    }

    #[test]
    fn test_env_prefix_and_handler_precedence() {
        let mut defaults = Defaults::new();
        defaults.set_env_prefix("GLOBAL");
        defaults.set_watch_handler(|s: &Store| s.set("by", "defaults"));

        let options = Options::new();
        assert_eq!(options.effective_env_prefix(&defaults).as_deref(), Some("GLOBAL"));

        let options = Options {
            env_prefix: "LOCAL".to_string(),
            ..Options::default()
        }
        .with_watch_handler(|s: &Store| s.set("by", "options"));
        assert_eq!(options.effective_env_prefix(&defaults).as_deref(), Some("LOCAL"));

        let store = Store::new();
        (options.effective_watch_handler(&defaults).unwrap())(&store);
        assert_eq!(store.get_string("by"), "options");

        (Options::new().effective_watch_handler(&defaults).unwrap())(&store);
        assert_eq!(store.get_string("by"), "defaults");
    }

    #[test]
    fn test_legacy_remote_fields() {
        let options = Options {
            is_remote: true,
            remote_provider: "consul".to_string(),
            remote_endpoint: "http://127.0.0.1:8500".to_string(),
            ..Options::default()
        };
        assert_eq!(options.source_kind(), SourceKind::Remote(Provider::Consul));
        assert_eq!(options.effective_endpoint(), "http://127.0.0.1:8500");

        let explicit = Options {
            provider: "etcd".to_string(),
            endpoint: "http://127.0.0.1:2379".to_string(),
            ..options
        };
        assert_eq!(explicit.source_kind(), SourceKind::Remote(Provider::Etcd));
        assert_eq!(explicit.effective_endpoint(), "http://127.0.0.1:2379");
    }

    #[test]
    fn test_deserialize_wire_names() {
        let options: Options = serde_json::from_str(
            r#"{
                "provider": "etcd",
                "type": "toml",
                "file": "/test.toml",
                "searchPath": ["./testdata"],
                "envPrefix": "MY",
                "endPoint": "http://127.0.0.1:2379",
                "secretKey": "k",
                "watch": true,
                "remote_endpoint": "http://fallback"
            }"#,
        )
        .unwrap();

        assert_eq!(options.config_type, "toml");
        assert_eq!(options.search_path, vec![PathBuf::from("./testdata")]);
        assert_eq!(options.endpoint, "http://127.0.0.1:2379");
        assert_eq!(options.remote_endpoint, "http://fallback");
        assert!(options.watch);
        assert!(!options.env);
        assert!(!format!("{:?}", options).contains("\"k\""));
    }
}
