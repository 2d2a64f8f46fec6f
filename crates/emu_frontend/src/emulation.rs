//! Emulation core collaborator interface

/// Performance counters reported by the emulation core
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerfStats {
    /// Frames the emulated software rendered per second
    pub game_fps: f64,
    /// Emulation speed relative to real hardware (1.0 = full speed)
    pub emulation_speed: f64,
}

/// What the frontend needs from the running emulation core
pub trait EmulationCore: Send + Sync {
    /// Counters accumulated since the previous call; reading resets them
    fn perf_stats(&self) -> PerfStats;

    /// Whether a title is loaded and running
    fn is_running(&self) -> bool;

    /// Name of the running title, empty when none is loaded
    fn title(&self) -> String;
}

/// Core with nothing loaded
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleCore;

impl EmulationCore for IdleCore {
    fn perf_stats(&self) -> PerfStats {
        PerfStats::default()
    }

    fn is_running(&self) -> bool {
        false
    }

    fn title(&self) -> String {
        String::new()
    }
}
