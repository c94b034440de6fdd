#![cfg(test)]

//! Logging for the crate's own unit tests.
//!
//! Shares the subscriber setup with the integration test binaries.

/// Idempotent. Filter precedence: `TEST_LOG`, then `RUST_LOG`, then `"warn"`.
pub fn init() {
    backend_test_support::logging::init();
}
