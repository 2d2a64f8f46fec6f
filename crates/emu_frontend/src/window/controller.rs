//! Per-window controller
//!
//! A [`WindowController`] owns one host window and its resolved surface. Each
//! [`WindowController::poll_events`] pulls the window's events from its
//! [`EventSource`], translates them into [`InputEvent`]s for the input sink,
//! follows resizes and close requests, and for the primary window refreshes
//! the frame-rate title.
//!
//! Lifecycle: `Open` until the user, the host or [`WindowController::request_close`]
//! closes it, then `Closed` for good. The owner discards closed controllers.

use std::sync::Arc;
use std::time::Duration;

use super::fullscreen::{self, FullscreenOutcome};
use super::presenter::{Presenter, SharedContext};
use super::title::FramerateTitle;
use super::{HostWindow, WindowError};
use crate::config::WindowConfig;
use crate::emulation::{EmulationCore, IdleCore};
use crate::events::{EventSource, RawEvent, RouteStats, WindowId};
use crate::foundation::time::{Clock, SystemClock};
use crate::input::{self, Action, InputEvent, InputSink, NullSink, WindowMetrics};
use crate::surface::{self, SurfaceDescriptor};

/// Window lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Accepting events
    Open,
    /// Closed; terminal
    Closed,
}

/// Role of a window in a multi-window frontend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowRole {
    /// Main window; shows the frame-rate title
    #[default]
    Primary,
    /// Additional screen window
    Secondary,
}

/// Controller for one host window
pub struct WindowController {
    window: Box<dyn HostWindow>,
    events: Box<dyn EventSource>,
    surface: SurfaceDescriptor,
    id: WindowId,
    state: WindowState,
    role: WindowRole,
    framebuffer: (u32, u32),
    title: Option<FramerateTitle>,
    presenter: Presenter,
    input: Box<dyn InputSink>,
    core: Arc<dyn EmulationCore>,
    scratch: Vec<RawEvent>,
}

impl WindowController {
    /// Start building a controller for a freshly created host window
    pub fn builder(
        window: Box<dyn HostWindow>,
        events: Box<dyn EventSource>,
    ) -> WindowControllerBuilder {
        WindowControllerBuilder {
            window,
            events,
            config: WindowConfig::default(),
            role: WindowRole::Primary,
            presenter: Presenter::graphics(),
            input: Box::new(NullSink),
            core: Arc::new(IdleCore),
            clock: Box::new(SystemClock::new()),
        }
    }

    /// Host window id
    pub const fn id(&self) -> WindowId {
        self.id
    }

    /// Window role
    pub const fn role(&self) -> WindowRole {
        self.role
    }

    /// Lifecycle state
    pub const fn state(&self) -> WindowState {
        self.state
    }

    /// Whether the window is still open
    pub fn is_open(&self) -> bool {
        self.state == WindowState::Open
    }

    /// Surface the graphics backend should render to
    pub const fn surface(&self) -> &SurfaceDescriptor {
        &self.surface
    }

    /// Last known framebuffer size in pixels
    pub const fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer
    }

    /// The host window
    pub fn host(&self) -> &dyn HostWindow {
        self.window.as_ref()
    }

    /// Handle every pending event for this window
    ///
    /// Must be called regularly for as long as the window lives, see
    /// [`crate::events`].
    pub fn poll_events(&mut self) -> RouteStats {
        let mut pending = std::mem::take(&mut self.scratch);
        let stats = self
            .events
            .poll_for(self.id, &mut |event| pending.push(event));

        for event in pending.drain(..) {
            self.handle(&event);
        }
        self.scratch = pending;

        self.update_title();
        stats
    }

    fn handle(&mut self, event: &RawEvent) {
        let window = &self.window;
        let metrics = || WindowMetrics {
            size: window.size(),
            pixel_size: window.size_in_pixels(),
        };
        match input::translate(event, metrics) {
            Action::Input(input) => self.input.on_input(input),
            Action::Resize => self.refresh_size(),
            Action::Close => self.request_close(),
            Action::Ignore => {}
        }
    }

    fn update_title(&mut self) {
        if !self.is_open() {
            return;
        }
        let Some(title) = self.title.as_mut() else {
            return;
        };
        let core = &self.core;
        if let Some(text) = title.poll(|| core.perf_stats()) {
            self.window.set_title(&text);
        }
    }

    /// Close the window; later calls do nothing
    pub fn request_close(&mut self) {
        if self.state == WindowState::Closed {
            return;
        }
        self.state = WindowState::Closed;
        log::info!("{} closed", self.id);
        self.input.on_input(InputEvent::CloseRequested);
    }

    /// Record a new framebuffer size and forward it to the input sink
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if self.framebuffer != (width, height) {
            log::debug!("{} framebuffer resized to {width}x{height}", self.id);
        }
        self.framebuffer = (width, height);
        self.input
            .on_input(InputEvent::ResizeRequested { width, height });
    }

    /// Re-query the live pixel size and apply it
    pub fn refresh_size(&mut self) {
        let (width, height) = self.window.size_in_pixels();
        self.on_resize(width, height);
    }

    /// Set the smallest client area the window may be resized to
    pub fn set_minimum_client_area(&mut self, width: u32, height: u32) {
        self.window.set_minimum_size(width.max(1), height.max(1));
    }

    /// Enlarge the window as far as the host allows
    pub fn enter_fullscreen(&mut self) -> FullscreenOutcome {
        fullscreen::enter_fullscreen(self.window.as_mut())
    }

    /// Put the latest frame on screen; failures are logged
    pub fn present(&mut self) {
        if let Err(err) = self.presenter.present(self.window.as_mut()) {
            log::warn!("{}: present failed: {err}", self.id);
        }
    }

    /// Context for a render thread drawing into this window
    pub const fn create_shared_context(&self) -> SharedContext {
        self.presenter.create_shared_context()
    }
}

impl std::fmt::Debug for WindowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowController")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("role", &self.role)
            .field("framebuffer", &self.framebuffer)
            .field("surface", &self.surface)
            .field("presenter", &self.presenter)
            .finish_non_exhaustive()
    }
}

/// Builder for [`WindowController`]
pub struct WindowControllerBuilder {
    window: Box<dyn HostWindow>,
    events: Box<dyn EventSource>,
    config: WindowConfig,
    role: WindowRole,
    presenter: Presenter,
    input: Box<dyn InputSink>,
    core: Arc<dyn EmulationCore>,
    clock: Box<dyn Clock + Send>,
}

impl WindowControllerBuilder {
    /// Window settings (title, fullscreen, minimum client area, title refresh)
    pub fn config(mut self, config: &WindowConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Window role
    pub const fn role(mut self, role: WindowRole) -> Self {
        self.role = role;
        self
    }

    /// Presentation strategy
    pub fn presenter(mut self, presenter: Presenter) -> Self {
        self.presenter = presenter;
        self
    }

    /// Receiver of translated input
    pub fn input_sink(mut self, sink: impl InputSink + 'static) -> Self {
        self.input = Box::new(sink);
        self
    }

    /// Emulation core providing performance counters
    pub fn core(mut self, core: Arc<dyn EmulationCore>) -> Self {
        self.core = core;
        self
    }

    /// Clock driving the frame-rate title
    pub fn clock(mut self, clock: Box<dyn Clock + Send>) -> Self {
        self.clock = clock;
        self
    }

    /// Finish window setup
    ///
    /// Sets the title, enters fullscreen if configured, resolves the native
    /// surface, reads the initial framebuffer size and applies the minimum
    /// client area.
    pub fn try_build(self) -> Result<WindowController, WindowError> {
        let Self {
            mut window,
            events,
            config,
            role,
            presenter,
            input,
            core,
            clock,
        } = self;

        window.set_title(&config.title);

        if config.fullscreen {
            let outcome = fullscreen::enter_fullscreen(window.as_mut());
            log::debug!("{}: started in {outcome:?} mode", window.id());
            window.hide_cursor();
        }

        let surface = surface::resolve(window.as_mut())?;
        let id = window.id();

        let title = match role {
            WindowRole::Primary => Some(FramerateTitle::new(
                config.title.clone(),
                Duration::from_millis(config.title_refresh_ms),
                clock,
            )),
            WindowRole::Secondary => None,
        };

        let mut controller = WindowController {
            window,
            events,
            surface,
            id,
            state: WindowState::Open,
            role,
            framebuffer: (0, 0),
            title,
            presenter,
            input,
            core,
            scratch: Vec::new(),
        };

        controller.refresh_size();
        let [min_width, min_height] = config.min_client_area;
        controller.set_minimum_client_area(min_width, min_height);

        log::info!(
            "Created {:?} {} ({}x{} pixels, {} surface)",
            role,
            id,
            controller.framebuffer.0,
            controller.framebuffer.1,
            controller.surface.system()
        );
        Ok(controller)
    }

    /// Finish window setup, terminating the process if the surface cannot be
    /// resolved
    pub fn build(self) -> WindowController {
        match self.try_build() {
            Ok(controller) => controller,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        }
    }
}
