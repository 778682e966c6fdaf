//! Venue-side request pacing

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Owned, venue-scoped serializer enforcing a minimum spacing between
/// outbound requests. Callers queue on the internal mutex in FIFO order,
/// so concurrent quote requests to the same venue are spaced correctly
/// without contaminating other venues.
pub struct RequestPacer {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Wait for the next request slot. The wait happens while holding the
    /// lock, which is what keeps consecutive grants at least
    /// `min_interval` apart.
    pub async fn acquire(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
