//! Per-pass pacing of outbound geocoder requests.
//!
//! A [`Throttle`] lives for exactly one resolution pass; there is no
//! process-wide "last request" clock. Consecutive lookups within a pass start
//! at least `interval` apart, whatever the previous lookup returned.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub(crate) struct Throttle {
    interval: Duration,
    last_lookup: Option<Instant>,
}

impl Throttle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_lookup: None,
        }
    }

    /// Waits until the next lookup may start, then records it as started.
    ///
    /// The first lookup of a pass never waits.
    pub(crate) async fn acquire(&mut self) {
        if let Some(last) = self.last_lookup {
            let next_allowed = last + self.interval;
            if Instant::now() < next_allowed {
                tracing::debug!(
                    wait_ms = u64::try_from((next_allowed - Instant::now()).as_millis())
                        .unwrap_or(u64::MAX),
                    "throttling geocoder lookup"
                );
                tokio::time::sleep_until(next_allowed).await;
            }
        }
        self.last_lookup = Some(Instant::now());
    }
}
