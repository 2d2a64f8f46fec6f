//! Window management
//!
//! ```text
//! ┌──────────────────────────┐
//! │   Frontend main loop     │
//! └────────────┬─────────────┘
//!              │ poll_events / present
//!   ┌──────────▼───────────┐      ┌──────────────┐
//!   │  WindowController    │─────▶│ EventSource  │ (router or demux)
//!   └──┬─────────┬─────────┘      └──────────────┘
//!      │         │ Presenter::{Software, Graphics}
//!   ┌──▼─────────▼──┐
//!   │  HostWindow   │ ← trait (backend.rs)
//!   └──────┬────────┘
//!          │ implemented by
//!   ┌──────▼────────┐
//!   │  GlfwWindow   │ ← `glfw` feature (glfw_host.rs)
//!   └───────────────┘
//! ```
//!
//! - **`backend`**: the host window contract and its error types
//! - **`controller`**: per-window event handling, lifecycle and title display
//! - **`fullscreen`**: exclusive, borderless, maximized fallback chain
//! - **`presenter`**: software and GPU presentation variants
//! - **`title`**: frame-rate title formatting and refresh timing

mod backend;
pub mod controller;
pub mod fullscreen;
#[cfg(feature = "glfw")]
pub mod glfw_host;
pub mod presenter;
pub mod title;

pub use backend::{Frame, FullscreenMode, HostError, HostWindow, WindowError, WindowFlags};
pub use controller::{WindowController, WindowControllerBuilder, WindowRole, WindowState};
pub use fullscreen::FullscreenOutcome;
pub use presenter::{FrameSource, Presenter, SharedContext};
