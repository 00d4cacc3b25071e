//! Centralized constants for configuration resolution.
//!
//! These are the hardcoded fallbacks used when neither the per-call
//! `Options` nor the `Defaults` registry provide a value.

use std::time::Duration;

// =============================================================================
// Resolution Fallbacks
// =============================================================================

/// Config name used when no name is configured anywhere.
pub const DEFAULT_CONFIG_NAME: &str = "config";

/// Config type used when no type is configured anywhere.
pub const DEFAULT_CONFIG_TYPE: &str = "yaml";

/// Subdirectory of the working directory appended to the fallback search path.
pub const DEFAULT_CONFIG_SUBDIR: &str = "config";

// =============================================================================
// Environment Overlay
// =============================================================================

/// Separator placed between the env prefix and the key.
pub const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator that replaces `.` in nested keys when mapped to env var names.
pub const ENV_KEY_SEPARATOR: &str = "_";

// =============================================================================
// Remote Polling
// =============================================================================

/// Delay between two re-reads of a watched remote source.
pub const DEFAULT_REMOTE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Field of a Firestore document that holds the configuration text.
pub const FIRESTORE_CONTENT_FIELD: &str = "content";

/// Marker at the start of a sealed remote payload.
pub const SEALED_PAYLOAD_PREFIX: &str = "uniconf:v1:";
