//! Shared minimum-interval gate for image model calls.
//!
//! Every call into the image generation service passes through one logical
//! gate, regardless of which book's pipeline is running. The gate admits
//! one call per configured minimum interval using governor's GCRA
//! algorithm, replacing ad-hoc "time since last request" bookkeeping with
//! lock-free state that is shared safely across concurrent pipeline runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Gate that serializes image-service calls to one per minimum interval.
///
/// Clone is cheap; all clones share the same GCRA state, so the interval is
/// enforced across every concurrently running pipeline.
///
/// # Examples
///
/// ```
/// use fabula_rate_limit::ImageCallGate;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = ImageCallGate::new(Duration::from_millis(10));
/// gate.wait().await; // first call passes immediately
/// gate.wait().await; // second call sleeps out the remaining interval
/// # }
/// ```
#[derive(Clone)]
pub struct ImageCallGate {
    limiter: Option<Arc<DirectRateLimiter>>,
    interval: Duration,
}

impl ImageCallGate {
    /// Create a gate admitting one call per `min_interval`.
    ///
    /// A zero interval disables gating entirely, which tests use to keep
    /// pipelines fast.
    pub fn new(min_interval: Duration) -> Self {
        let limiter = Quota::with_period(min_interval)
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        if limiter.is_none() {
            tracing::debug!("Image call gate disabled (zero interval)");
        }

        Self {
            limiter,
            interval: min_interval,
        }
    }

    /// Configured minimum interval between calls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the gate admits the next call.
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Non-blocking probe: returns true if a call is admitted right now.
    ///
    /// Consumes the slot on success. Used by tests that need deterministic
    /// assertions without timing sleeps.
    pub fn try_pass(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }
}

impl std::fmt::Debug for ImageCallGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCallGate")
            .field("interval", &self.interval)
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_passes_second_is_held() {
        let gate = ImageCallGate::new(Duration::from_millis(200));
        assert!(gate.try_pass());
        assert!(!gate.try_pass());
    }

    #[test]
    fn interval_elapses_and_gate_reopens() {
        let gate = ImageCallGate::new(Duration::from_millis(50));
        assert!(gate.try_pass());
        assert!(!gate.try_pass());
        std::thread::sleep(Duration::from_millis(80));
        assert!(gate.try_pass());
    }

    #[test]
    fn zero_interval_disables_gating() {
        let gate = ImageCallGate::new(Duration::ZERO);
        for _ in 0..10 {
            assert!(gate.try_pass());
        }
    }

    #[test]
    fn clones_share_state() {
        let gate = ImageCallGate::new(Duration::from_millis(200));
        let other = gate.clone();
        assert!(gate.try_pass());
        assert!(!other.try_pass());
    }

    #[tokio::test]
    async fn wait_enforces_spacing() {
        let gate = ImageCallGate::new(Duration::from_millis(40));
        let start = std::time::Instant::now();
        gate.wait().await;
        gate.wait().await;
        gate.wait().await;
        // Three calls need at least two full intervals between them.
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
