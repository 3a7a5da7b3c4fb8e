use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Single-flight request serializer.
///
/// Every lane is a FIFO-fair async mutex; holding the guard means owning the
/// lane until the whole call (all retries included) has settled. Lanes are
/// keyed by credential fingerprint, so one credential means one global chain.
#[derive(Default)]
pub struct RequestQueue {
    lanes: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Guard for an acquired lane; dropping it admits the next waiter.
pub type LaneGuard = OwnedMutexGuard<()>;

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the lane to be free and takes it.
    pub async fn acquire(&self, lane: &str) -> LaneGuard {
        let lane = {
            let mut lanes = self.lanes.lock().unwrap_or_else(|p| p.into_inner());
            lanes
                .entry(lane.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lane.lock_owned().await
    }

    #[cfg(test)]
    pub fn lane_count(&self) -> usize {
        self.lanes.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

/// Stable, non-reversible lane key for a credential.
pub fn credential_fingerprint(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}
