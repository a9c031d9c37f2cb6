//! Clock Module
//!
//! Millisecond time sources for entry timestamps. The cache reads time only
//! through [`Clock`], so expiry can be driven by a simulated clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of the current time in milliseconds.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> u64;
}

// == System Clock ==
/// Wall-clock time (Unix milliseconds).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Clones share the same underlying time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a manual clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward, stopping at `u64::MAX` ms.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
