//! Host window abstraction
//!
//! This module defines the trait every host windowing library must implement
//! for a window controller to drive it. The controller never talks to the
//! windowing library directly: it sees a [`HostWindow`] and the
//! [`crate::events::EventQueue`] the library feeds.

use std::ffi::c_void;
use std::ptr::NonNull;

use bitflags::bitflags;
use thiserror::Error;

use crate::events::WindowId;
use crate::surface::{NativeProperty, NativeValue};

bitflags! {
    /// Flags requested at window creation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        /// User may resize the window
        const RESIZABLE = 1 << 0;
        /// Drawable is allocated at the display's native pixel density
        const HIGH_PIXEL_DENSITY = 1 << 1;
        /// Window starts fullscreen
        const FULLSCREEN = 1 << 2;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self::RESIZABLE | Self::HIGH_PIXEL_DENSITY
    }
}

/// Fullscreen modes a host may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenMode {
    /// Take over the display with a dedicated video mode
    Exclusive,
    /// Cover the display at its current video mode
    Borderless,
}

impl std::fmt::Display for FullscreenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exclusive => f.write_str("exclusive fullscreen"),
            Self::Borderless => f.write_str("borderless fullscreen"),
        }
    }
}

/// One screen image handed to the host by a software presenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA8 pixels
    pub pixels: Vec<u8>,
}

/// Failure of a single host call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host rejected the request
    #[error("{operation} failed: {reason}")]
    Rejected {
        /// Operation that failed
        operation: &'static str,
        /// Host-provided reason
        reason: String,
    },
    /// The host has no such capability
    #[error("{0} is not supported by this host")]
    Unsupported(&'static str),
}

/// Window creation and host initialization errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The windowing library could not be initialized
    #[error("Failed to initialize windowing library: {0}")]
    Initialization(String),
    /// The window could not be created
    #[error("Failed to create window: {0}")]
    Creation(String),
    /// The window's rendering surface could not be resolved
    #[error(transparent)]
    Surface(#[from] crate::surface::SurfaceError),
}

/// A native window owned by a host windowing library
///
/// Implemented once per windowing library. A window controller owns its
/// `HostWindow` exclusively for the window's lifetime.
///
/// # Thread Safety
/// Not `Send`: most windowing libraries require window calls on the thread
/// that created the window.
pub trait HostWindow {
    /// Host-assigned id, stable for the window's lifetime
    fn id(&self) -> WindowId;

    /// Window size in screen coordinates
    fn size(&self) -> (u32, u32);

    /// Drawable size in pixels
    ///
    /// Differs from [`HostWindow::size`] on high-density displays. Always
    /// queried live; resize events do not necessarily carry final values.
    fn size_in_pixels(&self) -> (u32, u32);

    /// Set the title bar text
    fn set_title(&mut self, title: &str);

    /// Set the smallest client area the user may resize the window to
    fn set_minimum_size(&mut self, width: u32, height: u32);

    /// Switch to a fullscreen mode
    ///
    /// Returns an error if the host cannot enter the requested mode; the
    /// window is left as it was.
    fn set_fullscreen(&mut self, mode: FullscreenMode) -> Result<(), HostError>;

    /// Maximize the window
    fn maximize(&mut self);

    /// Hide the pointer while it is over the window
    fn hide_cursor(&mut self);

    /// Name of the active video driver (`"x11"`, `"wayland"`, ...), if any
    fn video_driver(&self) -> Option<String>;

    /// Query a platform-specific native handle
    ///
    /// Returns `None` when the property does not exist on this platform or
    /// the host cannot provide it.
    fn native_property(&self, property: NativeProperty) -> Option<NativeValue>;

    /// Create a Metal view for the window and return its `CAMetalLayer`
    ///
    /// Only meaningful on macOS; other hosts return `None`.
    fn create_metal_layer(&mut self) -> Option<NonNull<c_void>>;

    /// Show software-rendered frames
    fn present_frames(&mut self, frames: &[Frame]) -> Result<(), HostError>;
}
