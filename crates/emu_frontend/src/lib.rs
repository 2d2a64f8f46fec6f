//! # Emu Frontend
//!
//! Window event routing, native surface resolution and audio output for
//! emulator frontends, independent of any one windowing or audio library.
//!
//! ## Features
//!
//! - **Event Routing**: one host event queue split into per-window streams,
//!   either by re-queueing foreign events or through a demultiplexer
//! - **Window Controllers**: input translation, resize tracking, fullscreen
//!   fallback and a frame-rate title per window
//! - **Surface Resolution**: Win32, X11, Wayland, Metal and Android handles
//!   picked at runtime for the graphics backend
//! - **Audio Bridge**: real-time device callbacks forwarded to a push-style
//!   sink without buffering
//! - **Host Backends**: GLFW windows (`glfw` feature) and cpal audio (`cpal`
//!   feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use emu_frontend::prelude::*;
//!
//! fn run(window: Box<dyn HostWindow>, audio_host: &dyn AudioHost) {
//!     let queue: Arc<dyn EventQueue> = Arc::new(SharedEventQueue::new());
//!     let mut controller = WindowController::builder(window, Box::new(EventRouter::new(queue)))
//!         .config(&WindowConfig::default())
//!         .input_sink(|event: InputEvent| println!("{event:?}"))
//!         .build();
//!
//!     let audio = AudioBridge::from_config(audio_host, &AudioConfig::default());
//!     audio.set_sink(|buffer, _frames| buffer.fill(0));
//!
//!     while controller.is_open() {
//!         controller.poll_events();
//!         controller.present();
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod audio;
pub mod config;
pub mod emulation;
pub mod events;
pub mod foundation;
pub mod input;
pub mod surface;
pub mod window;

#[cfg(test)]
mod testing;

/// Common imports for frontend code
pub mod prelude {
    pub use crate::{
        audio::{AudioBridge, AudioHost, DeviceSelector, StreamFormat, NATIVE_SAMPLE_RATE},
        config::{AudioConfig, Config, FrontendConfig, WindowConfig},
        emulation::{EmulationCore, PerfStats},
        events::{
            demux::EventDemux, EventQueue, EventRouter, EventSource, RawEvent, SharedEventQueue,
            WindowId,
        },
        input::{InputEvent, InputSink, PointerButton},
        surface::SurfaceDescriptor,
        window::{
            FullscreenMode, HostWindow, Presenter, WindowController, WindowFlags, WindowRole,
        },
    };
}
