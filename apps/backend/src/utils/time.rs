//! Wall-clock helpers shared by the engine and the wire views.

use std::time::Duration;

use time::OffsetDateTime;

/// Milliseconds since the unix epoch, as sent to clients.
pub fn unix_ms(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Time left until `deadline`, zero if it already passed.
pub fn remaining(deadline: OffsetDateTime, now: OffsetDateTime) -> Duration {
    let left = deadline - now;
    if left.is_negative() {
        Duration::ZERO
    } else {
        left.unsigned_abs()
    }
}
