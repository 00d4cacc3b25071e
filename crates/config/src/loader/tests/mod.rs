//! Tests for `ConfigLoader::build`.
//!
//! Responsibilities:
//! - Test source resolution for file, content, and remote providers.
//! - Test `Options` over `Defaults` precedence end to end.
//! - Test the env overlay, file watching, and remote polling.
//!
//! Invariants:
//! - Tests touching the process environment use `serial_test` and `env_lock()`.
//! - Remote polling tests run on paused tokio time.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub mod watch_tests;

/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

pub use crate::test_util::init_tracing;

/// Drive `fut` on a fresh runtime; for tests that must stay synchronous
/// around `temp_env` closures.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
