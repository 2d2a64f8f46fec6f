//! Host event model and per-window event routing
//!
//! The host windowing library delivers every event for every window through a
//! single process-wide queue. Each window controller only wants its own
//! events, so this module provides two ways of splitting that queue:
//!
//! - [`EventRouter`]: each window drains the shared queue itself, handles the
//!   events addressed to it and pushes everything else back to the tail of
//!   the queue for the owning window's next poll.
//! - [`demux::EventDemux`]: the shared queue is drained once and every event is
//!   forwarded to a per-window channel, so nothing is ever re-queued.
//!
//! Both implement [`EventSource`], which is all a window controller needs.
//!
//! # Polling obligation
//!
//! With the re-push router, events addressed to a window stay in the shared
//! queue until that window polls. Every live window must therefore be polled
//! at a regular cadence by its owner; a window that never polls makes the
//! queue grow without bound. The router logs a warning once a single pass has
//! to re-queue [`BACKLOG_WARN_THRESHOLD`] foreign events.

pub mod demux;
mod queue;
mod router;

use std::path::PathBuf;

pub use queue::{EventQueue, SharedEventQueue};
pub use router::{EventRouter, EventSource, RouteStats, BACKLOG_WARN_THRESHOLD};

/// Identifier of a native window, assigned by the host at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Pointer device id the host uses for mouse events synthesized from touch
pub const TOUCH_MOUSE_ID: u32 = u32::MAX;

/// Raw event as delivered by the host event queue
///
/// Every variant except [`RawEvent::Quit`] and [`RawEvent::Device`] names the
/// window it is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// Window state change
    Window {
        /// Destination window
        window: WindowId,
        /// What happened
        event: WindowEventKind,
    },
    /// Keyboard key edge
    Key {
        /// Destination window
        window: WindowId,
        /// Physical key scancode
        scancode: u32,
        /// `true` for key down, `false` for key up
        down: bool,
        /// Auto-repeat of a key that is already down
        repeat: bool,
    },
    /// Pointer motion
    MouseMotion {
        /// Destination window
        window: WindowId,
        /// Pointer device id; [`TOUCH_MOUSE_ID`] when synthesized from touch
        which: u32,
        /// Position in window coordinates
        x: f32,
        /// Position in window coordinates
        y: f32,
    },
    /// Pointer button edge
    MouseButton {
        /// Destination window
        window: WindowId,
        /// Pointer device id; [`TOUCH_MOUSE_ID`] when synthesized from touch
        which: u32,
        /// Host button index (1 = left, 2 = middle, 3 = right, 4/5 = extra)
        button: u8,
        /// `true` for press, `false` for release
        down: bool,
        /// Position in window coordinates
        x: f32,
        /// Position in window coordinates
        y: f32,
    },
    /// Scroll wheel
    MouseWheel {
        /// Destination window
        window: WindowId,
        /// Pointer device id
        which: u32,
        /// Horizontal scroll amount
        dx: f32,
        /// Vertical scroll amount
        dy: f32,
    },
    /// Touch contact
    Finger {
        /// Destination window
        window: WindowId,
        /// Finger id, stable while the contact lasts
        finger: u64,
        /// Contact phase
        phase: FingerPhase,
        /// Position normalized to `[0, 1]`
        x: f32,
        /// Position normalized to `[0, 1]`
        y: f32,
    },
    /// Committed text input
    TextInput {
        /// Destination window
        window: WindowId,
        /// UTF-8 text
        text: String,
    },
    /// Drag-and-drop
    Drop {
        /// Destination window
        window: WindowId,
        /// Drop stage and payload
        payload: DropPayload,
    },
    /// Application-defined event
    User {
        /// Destination window
        window: WindowId,
        /// Application-defined code
        code: i32,
    },
    /// The application was asked to quit
    Quit,
    /// Input or audio device hot-plug
    Device {
        /// Host device id
        id: u32,
        /// `true` when attached, `false` when removed
        added: bool,
    },
}

impl RawEvent {
    /// Window this event is addressed to, if any
    ///
    /// Events without a destination window are accepted by whichever window
    /// polls first.
    pub const fn window_id(&self) -> Option<WindowId> {
        match self {
            Self::Window { window, .. }
            | Self::Key { window, .. }
            | Self::MouseMotion { window, .. }
            | Self::MouseButton { window, .. }
            | Self::MouseWheel { window, .. }
            | Self::Finger { window, .. }
            | Self::TextInput { window, .. }
            | Self::Drop { window, .. }
            | Self::User { window, .. } => Some(*window),
            Self::Quit | Self::Device { .. } => None,
        }
    }

    /// Whether a window with id `owner` should handle this event
    pub fn is_for(&self, owner: WindowId) -> bool {
        self.window_id().map_or(true, |id| id == owner)
    }
}

/// Window state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventKind {
    /// Window became visible
    Shown,
    /// Window was hidden
    Hidden,
    /// Window contents need redrawing
    Exposed,
    /// Window moved
    Moved {
        /// New x position
        x: i32,
        /// New y position
        y: i32,
    },
    /// Window size changed (screen coordinates, may not be final)
    Resized {
        /// Reported width
        width: i32,
        /// Reported height
        height: i32,
    },
    /// Drawable size in pixels changed
    PixelSizeChanged {
        /// Reported pixel width
        width: i32,
        /// Reported pixel height
        height: i32,
    },
    /// Window was minimized
    Minimized,
    /// Window was maximized
    Maximized,
    /// Window was restored from minimized or maximized
    Restored,
    /// Pointer entered the window
    MouseEnter,
    /// Pointer left the window
    MouseLeave,
    /// Window gained keyboard focus
    FocusGained,
    /// Window lost keyboard focus
    FocusLost,
    /// User asked to close the window
    CloseRequested,
    /// Window entered fullscreen
    EnterFullscreen,
    /// Window left fullscreen
    LeaveFullscreen,
    /// Content scale of the window's display changed
    DisplayScaleChanged,
    /// Window is being destroyed
    Destroyed,
}

/// Phase of a touch contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerPhase {
    /// Contact started
    Down,
    /// Contact moved
    Motion,
    /// Contact ended
    Up,
}

/// Drag-and-drop stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// A drop sequence started
    Begin,
    /// A file was dropped
    File(PathBuf),
    /// Text was dropped
    Text(String),
    /// The drop sequence finished
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_less_events_match_any_owner() {
        assert!(RawEvent::Quit.is_for(WindowId(1)));
        assert!(RawEvent::Device { id: 3, added: true }.is_for(WindowId(7)));
    }

    #[test]
    fn test_addressed_events_match_only_their_window() {
        let event = RawEvent::Key {
            window: WindowId(2),
            scancode: 4,
            down: true,
            repeat: false,
        };
        assert_eq!(event.window_id(), Some(WindowId(2)));
        assert!(event.is_for(WindowId(2)));
        assert!(!event.is_for(WindowId(1)));
    }
}
