//! Semantic input events
//!
//! A window controller turns each [`RawEvent`] addressed to it into at most
//! one [`Action`]. Input actions carry coordinates in the pixel space of the
//! owning window and are handed to the window's [`InputSink`], which is where
//! the input-mapping layer plugs in.
//!
//! Translation policy:
//! - pointer events from the touch-synthesized mouse ([`TOUCH_MOUSE_ID`]) are
//!   dropped, the matching finger events already report them
//! - pointer positions arrive in screen coordinates and are scaled by the
//!   window's live pixel ratio, negative values clamp to 0
//! - touch positions arrive normalized and are scaled by the window's pixel
//!   size at translation time, negative results clamp to 0
//! - key down and key up are separate edges and repeats are passed through
//! - every resize-class window event collapses into [`Action::Resize`]

use crate::events::{FingerPhase, RawEvent, WindowEventKind, TOUCH_MOUSE_ID};

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary button
    Left,
    /// Wheel button
    Middle,
    /// Secondary button
    Right,
    /// First extra button
    X1,
    /// Second extra button
    X2,
    /// Any other host button index
    Other(u8),
}

impl PointerButton {
    /// Map a host button index
    pub const fn from_host(index: u8) -> Self {
        match index {
            1 => Self::Left,
            2 => Self::Middle,
            3 => Self::Right,
            4 => Self::X1,
            5 => Self::X2,
            other => Self::Other(other),
        }
    }
}

/// Input event in the owning window's pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer moved
    PointerMoved {
        /// Pixel x
        x: u32,
        /// Pixel y
        y: u32,
    },
    /// Pointer button pressed
    PointerPressed {
        /// Button
        button: PointerButton,
        /// Pixel x
        x: u32,
        /// Pixel y
        y: u32,
    },
    /// Pointer button released
    PointerReleased {
        /// Button
        button: PointerButton,
        /// Pixel x
        x: u32,
        /// Pixel y
        y: u32,
    },
    /// Finger touched the screen
    TouchDown {
        /// Finger id
        finger: u64,
        /// Pixel x
        x: u32,
        /// Pixel y
        y: u32,
    },
    /// Finger moved
    TouchMoved {
        /// Finger id
        finger: u64,
        /// Pixel x
        x: u32,
        /// Pixel y
        y: u32,
    },
    /// Finger lifted
    TouchUp {
        /// Finger id
        finger: u64,
    },
    /// Key pressed, or auto-repeated while held
    KeyDown {
        /// Physical key scancode
        scancode: u32,
        /// Auto-repeat
        repeat: bool,
    },
    /// Key released
    KeyUp {
        /// Physical key scancode
        scancode: u32,
    },
    /// Window framebuffer changed size
    ResizeRequested {
        /// Pixel width
        width: u32,
        /// Pixel height
        height: u32,
    },
    /// Window is closing
    CloseRequested,
}

/// Receives translated input for one window
pub trait InputSink: Send {
    /// Handle one event
    fn on_input(&mut self, event: InputEvent);
}

impl<F> InputSink for F
where
    F: FnMut(InputEvent) + Send,
{
    fn on_input(&mut self, event: InputEvent) {
        self(event);
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl InputSink for NullSink {
    fn on_input(&mut self, _event: InputEvent) {}
}

/// What a window controller does with one raw event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward to the input sink
    Input(InputEvent),
    /// Re-query the framebuffer size
    Resize,
    /// Close the window
    Close,
    /// Nothing to do
    Ignore,
}

/// Live window extents used to place positional input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMetrics {
    /// Client size in screen coordinates
    pub size: (u32, u32),
    /// Framebuffer size in pixels
    pub pixel_size: (u32, u32),
}

impl WindowMetrics {
    /// Metrics of a window whose screen and pixel sizes match
    pub const fn uniform(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            pixel_size: (width, height),
        }
    }

    /// Pixels per screen coordinate on each axis; 1 for a degenerate extent
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_ratio(&self) -> (f32, f32) {
        let ratio = |pixels: u32, points: u32| {
            if points == 0 || pixels == 0 {
                1.0
            } else {
                pixels as f32 / points as f32
            }
        };
        (
            ratio(self.pixel_size.0, self.size.0),
            ratio(self.pixel_size.1, self.size.1),
        )
    }
}

/// Translate a raw event for its owning window
///
/// `metrics` is only called for positional events (pointer and touch).
pub fn translate(event: &RawEvent, metrics: impl FnOnce() -> WindowMetrics) -> Action {
    match *event {
        RawEvent::Window { event, .. } => match event {
            WindowEventKind::Resized { .. }
            | WindowEventKind::PixelSizeChanged { .. }
            | WindowEventKind::Maximized
            | WindowEventKind::Restored
            | WindowEventKind::Minimized => Action::Resize,
            WindowEventKind::CloseRequested => Action::Close,
            _ => Action::Ignore,
        },
        RawEvent::Quit => Action::Close,

        RawEvent::Key {
            scancode,
            down: true,
            repeat,
            ..
        } => Action::Input(InputEvent::KeyDown { scancode, repeat }),
        RawEvent::Key {
            scancode,
            down: false,
            ..
        } => Action::Input(InputEvent::KeyUp { scancode }),

        RawEvent::MouseMotion { which, .. } | RawEvent::MouseButton { which, .. }
            if which == TOUCH_MOUSE_ID =>
        {
            Action::Ignore
        }
        RawEvent::MouseMotion { x, y, .. } => {
            let (x, y) = pointer_to_pixel(x, y, &metrics());
            Action::Input(InputEvent::PointerMoved { x, y })
        }
        RawEvent::MouseButton {
            button, down, x, y, ..
        } => {
            let button = PointerButton::from_host(button);
            let (x, y) = pointer_to_pixel(x, y, &metrics());
            Action::Input(if down {
                InputEvent::PointerPressed { button, x, y }
            } else {
                InputEvent::PointerReleased { button, x, y }
            })
        }

        RawEvent::Finger {
            finger, phase, x, y, ..
        } => match phase {
            FingerPhase::Up => Action::Input(InputEvent::TouchUp { finger }),
            FingerPhase::Down | FingerPhase::Motion => {
                let (x, y) = touch_to_pixel(x, y, metrics().pixel_size);
                Action::Input(if phase == FingerPhase::Down {
                    InputEvent::TouchDown { finger, x, y }
                } else {
                    InputEvent::TouchMoved { finger, x, y }
                })
            }
        },

        RawEvent::MouseWheel { .. }
        | RawEvent::TextInput { .. }
        | RawEvent::Drop { .. }
        | RawEvent::User { .. }
        | RawEvent::Device { .. } => Action::Ignore,
    }
}

/// Pointer position in screen coordinates to pixel position
///
/// Each axis is clamped to 0, then scaled by the window's pixel ratio and
/// truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pointer_to_pixel(x: f32, y: f32, metrics: &WindowMetrics) -> (u32, u32) {
    let (ratio_x, ratio_y) = metrics.pixel_ratio();
    (
        (x.max(0.0) * ratio_x) as u32,
        (y.max(0.0) * ratio_y) as u32,
    )
}

/// Normalized touch position to pixel position in a `(width, height)` window
///
/// Each axis is `round(v * extent)`, clamped to 0.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn touch_to_pixel(x: f32, y: f32, (width, height): (u32, u32)) -> (u32, u32) {
    let scale = |v: f32, extent: u32| (v * extent as f32).round().max(0.0) as u32;
    (scale(x, width), scale(y, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowId;

    const W: WindowId = WindowId(1);

    fn no_size() -> WindowMetrics {
        panic!("window size queried for a non-positional event")
    }

    fn hidpi() -> WindowMetrics {
        WindowMetrics {
            size: (400, 480),
            pixel_size: (800, 960),
        }
    }

    #[test]
    fn test_touch_scaling_rounds_and_clamps() {
        assert_eq!(touch_to_pixel(0.0, 0.0, (400, 480)), (0, 0));
        assert_eq!(touch_to_pixel(1.0, 1.0, (400, 480)), (400, 480));
        assert_eq!(touch_to_pixel(0.5, 0.25, (400, 480)), (200, 120));
        // 0.0013 * 400 = 0.52 rounds up, 0.001 * 480 = 0.48 rounds down
        assert_eq!(touch_to_pixel(0.0013, 0.001, (400, 480)), (1, 0));
        assert_eq!(touch_to_pixel(-0.2, -1.0, (400, 480)), (0, 0));
    }

    #[test]
    fn test_touch_uses_live_pixel_size() {
        let event = RawEvent::Finger {
            window: W,
            finger: 3,
            phase: FingerPhase::Down,
            x: 0.5,
            y: 0.5,
        };
        assert_eq!(
            translate(&event, hidpi),
            Action::Input(InputEvent::TouchDown {
                finger: 3,
                x: 400,
                y: 480
            })
        );
        assert_eq!(
            translate(&event, || WindowMetrics::uniform(400, 480)),
            Action::Input(InputEvent::TouchDown {
                finger: 3,
                x: 200,
                y: 240
            })
        );
    }

    #[test]
    fn test_touch_phases() {
        let motion = RawEvent::Finger {
            window: W,
            finger: 1,
            phase: FingerPhase::Motion,
            x: 0.1,
            y: 0.2,
        };
        assert_eq!(
            translate(&motion, || WindowMetrics::uniform(100, 100)),
            Action::Input(InputEvent::TouchMoved {
                finger: 1,
                x: 10,
                y: 20
            })
        );
        let up = RawEvent::Finger {
            window: W,
            finger: 1,
            phase: FingerPhase::Up,
            x: 0.1,
            y: 0.2,
        };
        assert_eq!(
            translate(&up, no_size),
            Action::Input(InputEvent::TouchUp { finger: 1 })
        );
    }

    #[test]
    fn test_touch_synthesized_pointer_events_are_suppressed() {
        let motion = RawEvent::MouseMotion {
            window: W,
            which: TOUCH_MOUSE_ID,
            x: 10.0,
            y: 10.0,
        };
        let press = RawEvent::MouseButton {
            window: W,
            which: TOUCH_MOUSE_ID,
            button: 1,
            down: true,
            x: 10.0,
            y: 10.0,
        };
        assert_eq!(translate(&motion, no_size), Action::Ignore);
        assert_eq!(translate(&press, no_size), Action::Ignore);
    }

    #[test]
    fn test_pointer_events_clamp_negative_coordinates() {
        let motion = RawEvent::MouseMotion {
            window: W,
            which: 0,
            x: -3.0,
            y: 12.7,
        };
        assert_eq!(
            translate(&motion, || WindowMetrics::uniform(400, 480)),
            Action::Input(InputEvent::PointerMoved { x: 0, y: 12 })
        );

        let release = RawEvent::MouseButton {
            window: W,
            which: 0,
            button: 3,
            down: false,
            x: 5.0,
            y: -1.0,
        };
        assert_eq!(
            translate(&release, || WindowMetrics::uniform(400, 480)),
            Action::Input(InputEvent::PointerReleased {
                button: PointerButton::Right,
                x: 5,
                y: 0
            })
        );
    }

    #[test]
    fn test_pointer_scales_to_pixel_space_like_touch() {
        let motion = RawEvent::MouseMotion {
            window: W,
            which: 0,
            x: 200.0,
            y: 240.0,
        };
        let finger = RawEvent::Finger {
            window: W,
            finger: 0,
            phase: FingerPhase::Down,
            x: 0.5,
            y: 0.5,
        };
        assert_eq!(
            translate(&motion, hidpi),
            Action::Input(InputEvent::PointerMoved { x: 400, y: 480 })
        );
        assert_eq!(
            translate(&finger, hidpi),
            Action::Input(InputEvent::TouchDown {
                finger: 0,
                x: 400,
                y: 480
            })
        );

        let press = RawEvent::MouseButton {
            window: W,
            which: 0,
            button: 1,
            down: true,
            x: 10.5,
            y: -4.0,
        };
        assert_eq!(
            translate(&press, hidpi),
            Action::Input(InputEvent::PointerPressed {
                button: PointerButton::Left,
                x: 21,
                y: 0
            })
        );
    }

    #[test]
    fn test_degenerate_window_size_keeps_pointer_unscaled() {
        let metrics = WindowMetrics {
            size: (0, 480),
            pixel_size: (0, 960),
        };
        assert_eq!(metrics.pixel_ratio(), (1.0, 2.0));
        assert_eq!(pointer_to_pixel(7.9, 3.0, &metrics), (7, 6));
    }

    #[test]
    fn test_key_edges_are_distinct_and_repeats_pass_through() {
        let key = |down, repeat| RawEvent::Key {
            window: W,
            scancode: 44,
            down,
            repeat,
        };
        assert_eq!(
            translate(&key(true, false), no_size),
            Action::Input(InputEvent::KeyDown {
                scancode: 44,
                repeat: false
            })
        );
        assert_eq!(
            translate(&key(true, true), no_size),
            Action::Input(InputEvent::KeyDown {
                scancode: 44,
                repeat: true
            })
        );
        assert_eq!(
            translate(&key(false, false), no_size),
            Action::Input(InputEvent::KeyUp { scancode: 44 })
        );
    }

    #[test]
    fn test_resize_class_events_funnel_into_resize() {
        for kind in [
            WindowEventKind::Resized {
                width: 1,
                height: 1,
            },
            WindowEventKind::PixelSizeChanged {
                width: 2,
                height: 2,
            },
            WindowEventKind::Maximized,
            WindowEventKind::Restored,
            WindowEventKind::Minimized,
        ] {
            let event = RawEvent::Window {
                window: W,
                event: kind,
            };
            assert_eq!(translate(&event, no_size), Action::Resize, "{kind:?}");
        }
    }

    #[test]
    fn test_close_and_quit_close_the_window() {
        let close = RawEvent::Window {
            window: W,
            event: WindowEventKind::CloseRequested,
        };
        assert_eq!(translate(&close, no_size), Action::Close);
        assert_eq!(translate(&RawEvent::Quit, no_size), Action::Close);
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(PointerButton::from_host(1), PointerButton::Left);
        assert_eq!(PointerButton::from_host(2), PointerButton::Middle);
        assert_eq!(PointerButton::from_host(5), PointerButton::X2);
        assert_eq!(PointerButton::from_host(9), PointerButton::Other(9));
    }
}
