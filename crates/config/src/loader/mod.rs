//! Source resolution and loading.
//!
//! Responsibilities:
//! - Provide the `ConfigLoader` builder whose `build()` turns `Options` plus
//!   `Defaults` into a loaded `Store`.
//! - Dispatch to the file, content, or remote loader by provider.
//! - Apply the environment overlay and arm watches.
//!
//! Does NOT handle:
//! - Parsing formats or talking to backends (see `format`, `remote`, `store`).
//!
//! Invariants / Assumptions:
//! - Every build creates a fresh `Store`; stores are never reused across builds.
//! - `build()` returns either a fully loaded store or the loader's error.
//! - The environment overlay runs only after a successful load.

mod builder;
mod content;
mod env;
mod file;
mod remote;
mod watch;

#[cfg(test)]
mod tests;

pub use builder::{ConfigLoader, build};
