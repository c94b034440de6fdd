//! Realtime transport: websocket sessions and the hub that fans engine
//! events out to them.

pub mod hub;
pub mod protocol;
pub mod session;
