#![allow(dead_code)]

// tests/common/mod.rs
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Upper bound for anything a test waits on. Timer-driven tests use
/// millisecond deadlines, so hitting this means the engine stalled.
pub const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Read a response body as JSON.
pub async fn json_body<B>(resp: ServiceResponse<B>) -> Value
where
    B: MessageBody,
{
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("response body should be JSON")
}
