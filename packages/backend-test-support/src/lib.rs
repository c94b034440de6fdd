//! Backend test support utilities
//!
//! Shared by the engine's integration test binaries.

pub mod logging;
