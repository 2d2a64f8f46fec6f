//! Fullscreen fallback chain

use super::{FullscreenMode, HostWindow, WindowFlags};

/// State the window ended up in after [`enter_fullscreen`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenOutcome {
    /// Exclusive fullscreen succeeded
    Exclusive,
    /// Exclusive failed, borderless fullscreen succeeded
    Borderless,
    /// Both fullscreen modes failed, the window was maximized
    Maximized,
}

/// Enlarge `window` as far as the host allows
///
/// Tries exclusive fullscreen, then borderless fullscreen at the current
/// video mode, then maximizes. Failures are logged and never returned.
pub fn enter_fullscreen(window: &mut dyn HostWindow) -> FullscreenOutcome {
    let id = window.id();

    match window.set_fullscreen(FullscreenMode::Exclusive) {
        Ok(()) => return FullscreenOutcome::Exclusive,
        Err(err) => log::error!("{id}: {} failed: {err}", FullscreenMode::Exclusive),
    }

    match window.set_fullscreen(FullscreenMode::Borderless) {
        Ok(()) => return FullscreenOutcome::Borderless,
        Err(err) => log::error!("{id}: {} failed: {err}", FullscreenMode::Borderless),
    }

    log::info!("{id}: falling back on a maximized window");
    window.maximize();
    FullscreenOutcome::Maximized
}

/// Apply the creation-time flags a host window was asked for
///
/// Returns the fullscreen outcome when [`WindowFlags::FULLSCREEN`] is set.
pub fn apply_creation_flags(
    window: &mut dyn HostWindow,
    flags: WindowFlags,
) -> Option<FullscreenOutcome> {
    flags
        .contains(WindowFlags::FULLSCREEN)
        .then(|| enter_fullscreen(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWindow;

    #[test]
    fn test_exclusive_success_stops_the_chain() {
        let mut window = MockWindow::new(1);
        assert_eq!(enter_fullscreen(&mut window), FullscreenOutcome::Exclusive);
        let state = window.state();
        assert_eq!(state.fullscreen_attempts, vec![FullscreenMode::Exclusive]);
        assert_eq!(state.fullscreen, Some(FullscreenMode::Exclusive));
        assert!(!state.maximized);
    }

    #[test]
    fn test_exclusive_failure_tries_borderless() {
        let mut window = MockWindow::new(1).failing_fullscreen(&[FullscreenMode::Exclusive]);
        assert_eq!(enter_fullscreen(&mut window), FullscreenOutcome::Borderless);
        let state = window.state();
        assert_eq!(
            state.fullscreen_attempts,
            vec![FullscreenMode::Exclusive, FullscreenMode::Borderless]
        );
        assert_eq!(state.fullscreen, Some(FullscreenMode::Borderless));
        assert!(!state.maximized);
    }

    #[test]
    fn test_both_failures_maximize() {
        let mut window = MockWindow::new(1)
            .failing_fullscreen(&[FullscreenMode::Exclusive, FullscreenMode::Borderless]);
        assert_eq!(enter_fullscreen(&mut window), FullscreenOutcome::Maximized);
        let state = window.state();
        assert_eq!(
            state.fullscreen_attempts,
            vec![FullscreenMode::Exclusive, FullscreenMode::Borderless]
        );
        assert_eq!(state.fullscreen, None);
        assert!(state.maximized);
    }

    #[test]
    fn test_fullscreen_flag_runs_the_whole_chain() {
        let mut window = MockWindow::new(1).failing_fullscreen(&[FullscreenMode::Exclusive]);
        let flags = WindowFlags::default() | WindowFlags::FULLSCREEN;
        assert_eq!(
            apply_creation_flags(&mut window, flags),
            Some(FullscreenOutcome::Borderless)
        );
        assert_eq!(
            window.state().fullscreen_attempts,
            vec![FullscreenMode::Exclusive, FullscreenMode::Borderless]
        );

        let mut windowed = MockWindow::new(2);
        assert_eq!(apply_creation_flags(&mut windowed, WindowFlags::default()), None);
        assert!(windowed.state().fullscreen_attempts.is_empty());
    }
}
