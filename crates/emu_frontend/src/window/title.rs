//! Rolling frame-rate display in the title bar

use std::time::Duration;

use crate::emulation::PerfStats;
use crate::foundation::time::{Clock, IntervalTimer};

/// Default refresh period of the frame-rate title
pub const TITLE_REFRESH_INTERVAL: Duration = Duration::from_millis(2000);

/// Format the title for one stats snapshot
pub fn format_title(base: &str, stats: PerfStats) -> String {
    format!(
        "{base} | FPS: {:.0} ({:.0}%)",
        stats.game_fps,
        stats.emulation_speed * 100.0
    )
}

/// Rewrites the window title with fresh performance counters once per
/// refresh interval
pub struct FramerateTitle {
    base: String,
    clock: Box<dyn Clock + Send>,
    timer: IntervalTimer,
}

impl FramerateTitle {
    /// Start the display; the first update is due one interval from now
    pub fn new(base: impl Into<String>, interval: Duration, clock: Box<dyn Clock + Send>) -> Self {
        let timer = IntervalTimer::new(interval, clock.now_ms());
        Self {
            base: base.into(),
            clock,
            timer,
        }
    }

    /// Title without the counters
    pub fn base(&self) -> &str {
        &self.base
    }

    /// New title text if the interval has elapsed
    ///
    /// `stats` is only called when an update is due, so the core's counters
    /// are read (and reset) exactly once per update.
    pub fn poll(&mut self, stats: impl FnOnce() -> PerfStats) -> Option<String> {
        if self.timer.poll(self.clock.now_ms()) {
            Some(format_title(&self.base, stats()))
        } else {
            None
        }
    }
}

impl std::fmt::Debug for FramerateTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramerateTitle")
            .field("base", &self.base)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}
