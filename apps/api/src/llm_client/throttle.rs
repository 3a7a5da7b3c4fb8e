use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum spacing between consecutive provider dispatches.
///
/// Each caller reserves the next free dispatch slot under a short lock and
/// then sleeps until that slot, so concurrent callers on different queue
/// lanes are spaced as well.
pub struct Throttle {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Waits until a dispatch is allowed and records it as the last dispatch.
    pub async fn wait(&self) {
        let now = Instant::now();
        let slot = {
            let mut last = self
                .last_dispatch
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let slot = match *last {
                Some(previous) => (previous + self.min_interval).max(now),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        if slot > now {
            debug!(wait_ms = (slot - now).as_millis() as u64, "throttling dispatch");
            tokio::time::sleep_until(slot).await;
        }
    }
}
