use std::time::Duration;

use tokio::time::{sleep, timeout};

use super::recording::RecordingNotifier;

const POLL: Duration = Duration::from_millis(5);

/// Poll `check` until it holds or `limit` passes. Returns whether it held.
pub async fn wait_for<F>(limit: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    timeout(limit, async {
        while !check() {
            sleep(POLL).await;
        }
    })
    .await
    .is_ok()
}

/// Wait until at least `n` events named `name` were recorded.
pub async fn wait_for_events(
    recorder: &RecordingNotifier,
    name: &str,
    n: usize,
    limit: Duration,
) -> bool {
    wait_for(limit, || recorder.count(name) >= n).await
}
