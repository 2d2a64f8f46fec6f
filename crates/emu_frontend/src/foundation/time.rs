//! Time management utilities
//!
//! The frame-rate display measures wall-clock time in milliseconds through the
//! [`Clock`] trait so that tests can drive it with a [`ManualClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic milliseconds
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary, fixed origin
    fn now_ms(&self) -> u64;
}

/// Wall-clock time measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Manually advanced clock
///
/// Clones share the same time value, so a test can keep one handle and give
/// another to the component under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now.fetch_add(by, Ordering::Relaxed);
    }

    /// Jump to an absolute reading
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Fires once per elapsed interval
///
/// Tracks the last time it fired; [`IntervalTimer::poll`] returns `true` and
/// rearms when at least `interval` has passed since then.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval_ms: u64,
    last_fired_ms: u64,
}

impl IntervalTimer {
    /// Create a timer armed at `now_ms`
    pub const fn new(interval: Duration, now_ms: u64) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            last_fired_ms: now_ms,
        }
    }

    /// The configured interval
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Returns `true` once the interval has elapsed, then rearms at `now_ms`
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_fired_ms) >= self.interval_ms {
            self.last_fired_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Paces a loop to one frame per interval
///
/// [`FramePacer::remaining`] says how long the loop may block waiting for
/// host events before the next frame is due. A loop that falls more than one
/// interval behind resynchronizes instead of bursting to catch up.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    interval_ms: u64,
    next_frame_ms: u64,
}

impl FramePacer {
    /// Create a pacer whose first frame is due one interval after `now_ms`
    pub const fn new(interval: Duration, now_ms: u64) -> Self {
        let interval_ms = interval.as_millis() as u64;
        Self {
            interval_ms,
            next_frame_ms: now_ms.saturating_add(interval_ms),
        }
    }

    /// Time until the next frame is due; zero once it is
    pub const fn remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.next_frame_ms.saturating_sub(now_ms))
    }

    /// Record a finished frame and schedule the next one
    pub fn frame_done(&mut self, now_ms: u64) {
        self.next_frame_ms = self.next_frame_ms.saturating_add(self.interval_ms);
        if self.next_frame_ms <= now_ms {
            self.next_frame_ms = now_ms.saturating_add(self.interval_ms);
        }
    }
}
