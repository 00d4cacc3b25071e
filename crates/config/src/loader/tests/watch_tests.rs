//! File watch tests through the loader.

use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

use crate::defaults::Defaults;
use crate::loader::builder::build;
use crate::options::Options;
use crate::store::Store;

use super::write_file;

#[tokio::test]
async fn test_file_watch_reloads_and_notifies() {
    super::init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.yaml", "mode: initial\n");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let options = Options {
        file: path.display().to_string(),
        watch: true,
        ..Options::default()
    }
    .with_watch_handler(move |store: &Store| {
        let _ = tx.send(store.get_string("mode"));
    });

    let store = build(&Defaults::new(), Some(options)).await.unwrap();
    assert!(store.is_watching());
    assert_eq!(store.get_string("mode"), "initial");

    std::fs::write(&path, "mode: updated\n").unwrap();

    let mut last = String::new();
    while last != "updated" {
        last = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("handler should fire after the file changes")
            .unwrap();
    }
    assert_eq!(store.get_string("mode"), "updated");
    store.unwatch();
}

#[tokio::test]
async fn test_watch_without_handler_still_reloads() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.toml", "retries = 1\n");
    let options = Options {
        file: path.display().to_string(),
        watch: true,
        ..Options::default()
    };

    let store = build(&Defaults::new(), Some(options)).await.unwrap();
    std::fs::write(&path, "retries = 4\n").unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while store.get_i64("retries") != 4 {
        assert!(tokio::time::Instant::now() < deadline, "file was not reloaded");
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
