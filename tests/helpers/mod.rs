//! Test helpers module
//!
//! Mock events API, a recording host and JSON fixtures shared by the
//! integration tests.

#![allow(dead_code)]

pub mod api_mock;
pub mod host;
pub mod test_data;

pub use api_mock::*;
pub use host::*;
pub use test_data::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("event_admin=debug")
            .with_test_writer()
            .try_init();
    });
}
