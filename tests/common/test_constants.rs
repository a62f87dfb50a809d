//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Project id used by tests that exercise the administrative API.
pub const TEST_PROJECT: &str = "demo-project";

/// Static bearer token handed to the administrative API client.
pub const TEST_TOKEN: &str = "integration-token";

/// Environment variables the facade or its configuration consult.
pub const AMBIENT_VARS: &[&str] = &[
    "MODULES_USE_ADMIN_API",
    "GOOGLE_CLOUD_PROJECT",
    "GAE_APPLICATION",
    "APPLICATION_ID",
    "GAE_SERVICE",
    "GAE_VERSION",
    "CURRENT_VERSION_ID",
    "GAE_INSTANCE",
    "API_HOST",
    "API_PORT",
    "MODULES_ADMIN_ENDPOINT",
    "MODULES_ADMIN_ACCESS_TOKEN",
    "MODULES_ADMIN_METADATA_HOST",
    "MODULES_ADMIN_TIMEOUT_SECS",
    "MODCTL_CONFIG_PATH",
    "MODCTL_LOG",
];
