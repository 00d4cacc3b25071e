//! Integration tests for building stores through the public API.
//!
//! These tests drive `uniconf::build` end to end for the local sources:
//! explicit files, search-path scans, inline content, and typed extraction.

use serde::Deserialize;
use std::path::PathBuf;
use tempfile::TempDir;
use uniconf::{ConfigError, ConfigFormat, Defaults, Options, SourceKind, Store, build};

#[derive(Debug, Deserialize, PartialEq)]
struct Database {
    host: String,
    port: u16,
    replicas: Vec<String>,
}

const YAML: &str = "\
database:
  host: db.internal
  port: 5432
  replicas: [r1, r2]
features:
  beta: true
";

#[tokio::test]
async fn test_build_from_search_path_and_unmarshal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("service.yml"), YAML).unwrap();

    let mut defaults = Defaults::new();
    defaults.set_config_name("service");
    defaults.set_search_path([dir.path()]);

    let store = build(&defaults, None).await.expect("config should load");
    assert_eq!(store.config_file_used(), Some(dir.path().join("service.yml")));
    assert!(store.get_bool("features.beta"));

    let db: Database = store.unmarshal_key("database").unwrap();
    assert_eq!(
        db,
        Database {
            host: "db.internal".to_string(),
            port: 5432,
            replicas: vec!["r1".to_string(), "r2".to_string()],
        }
    );
}

#[tokio::test]
async fn test_build_from_dotenv_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.env");
    std::fs::write(&path, "API_URL=https://api.example.com\nRETRIES=3\n").unwrap();

    let options = Options {
        file: path.display().to_string(),
        ..Options::default()
    };
    let store = build(&Defaults::new(), Some(options)).await.unwrap();
    assert_eq!(store.get_string("api_url"), "https://api.example.com");
    assert_eq!(store.get_i64("retries"), 3);
}

#[tokio::test]
async fn test_options_deserialized_from_json() {
    let options: Options = serde_json::from_str(
        r#"{"provider": "content", "type": "json", "file": "{\"level\": \"warn\"}"}"#,
    )
    .unwrap();
    assert_eq!(options.source_kind(), SourceKind::Content);

    let store = build(&Defaults::new(), Some(options)).await.unwrap();
    assert_eq!(store.get_string("level"), "warn");
}

#[tokio::test]
async fn test_store_overrides_and_defaults_layering() {
    let options = Options {
        provider: "content".to_string(),
        config_type: "toml".to_string(),
        file: "[http]\nport = 8080\n".to_string(),
        ..Options::default()
    };
    let store: Store = build(&Defaults::new(), Some(options)).await.unwrap();

    store.set_default("http.port", 80);
    store.set_default("http.timeout", 30);
    assert_eq!(store.get_i64("http.port"), 8080);
    assert_eq!(store.get_i64("http.timeout"), 30);

    store.set("HTTP.Port", 9000);
    assert_eq!(store.get_i64("http.port"), 9000);
    assert!(store.all_keys().contains(&"http.timeout".to_string()));
}

#[tokio::test]
async fn test_not_found_reports_searched_directories() {
    let dir = TempDir::new().unwrap();
    let options = Options {
        name: "missing".to_string(),
        search_path: vec![dir.path().to_path_buf()],
        ..Options::default()
    };

    match build(&Defaults::new(), Some(options)).await {
        Err(ConfigError::ConfigNotFound { searched, .. }) => {
            assert_eq!(searched, vec![PathBuf::from(dir.path())]);
        }
        other => panic!("expected ConfigNotFound, got {other:?}"),
    }
}

#[test]
fn test_format_names() {
    assert_eq!("yml".parse::<ConfigFormat>().unwrap(), ConfigFormat::Yaml);
    assert_eq!(ConfigFormat::Toml.to_string(), "toml");
    assert!("xml".parse::<ConfigFormat>().is_err());
}
