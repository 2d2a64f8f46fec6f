//! GLFW host windows
//!
//! [`GlfwPlatform`] owns the GLFW context and turns the per-window GLFW event
//! receivers into [`RawEvent`]s on one shared [`EventQueue`], which is the
//! shape window controllers expect. [`GlfwWindow`] implements
//! [`HostWindow`]; native handles come from GLFW's `raw-window-handle`
//! support.
//!
//! GLFW has no window ids, so the platform assigns them in creation order.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;
use std::time::Duration;

use glfw::{Action, Glfw, GlfwReceiver, PWindow, WindowEvent};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use super::fullscreen;
use super::{Frame, FullscreenMode, HostError, HostWindow, WindowError, WindowFlags};
use crate::config::WindowConfig;
use crate::events::{DropPayload, EventQueue, RawEvent, WindowEventKind, WindowId};
use crate::surface::{NativeProperty, NativeValue};

struct Registration {
    id: WindowId,
    events: GlfwReceiver<(f64, WindowEvent)>,
    cursor: (f64, f64),
}

/// GLFW context feeding a shared event queue
pub struct GlfwPlatform {
    glfw: Glfw,
    queue: Arc<dyn EventQueue>,
    windows: Vec<Registration>,
    next_id: u32,
}

impl GlfwPlatform {
    /// Initialize GLFW
    ///
    /// # Errors
    /// Returns [`WindowError::Initialization`] if GLFW cannot start; the
    /// caller decides whether to run without windows.
    pub fn init(queue: Arc<dyn EventQueue>) -> Result<Self, WindowError> {
        let glfw = glfw::init(glfw::log_errors)
            .map_err(|e| WindowError::Initialization(format!("{e:?}")))?;
        log::info!("Initialized GLFW {}", glfw::get_version_string());
        Ok(Self {
            glfw,
            queue,
            windows: Vec::new(),
            next_id: 1,
        })
    }

    /// Queue receiving this platform's events
    pub fn queue(&self) -> &Arc<dyn EventQueue> {
        &self.queue
    }

    /// Create a window; the rendering API owns the surface, so no GL context
    /// is attached
    pub fn create_window(
        &mut self,
        config: &WindowConfig,
        flags: WindowFlags,
    ) -> Result<GlfwWindow, WindowError> {
        self.glfw
            .window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        self.glfw.window_hint(glfw::WindowHint::Resizable(
            flags.contains(WindowFlags::RESIZABLE),
        ));
        self.glfw.window_hint(glfw::WindowHint::ScaleToMonitor(
            flags.contains(WindowFlags::HIGH_PIXEL_DENSITY),
        ));

        let (mut window, events) = self
            .glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or_else(|| {
                WindowError::Creation(format!("{}x{} window", config.width, config.height))
            })?;
        window.set_all_polling(true);

        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.windows.push(Registration {
            id,
            events,
            cursor: (0.0, 0.0),
        });

        let mut window = GlfwWindow {
            glfw: self.glfw.clone(),
            window,
            id,
            #[cfg(target_os = "macos")]
            metal_layer: None,
        };
        if let Some(outcome) = fullscreen::apply_creation_flags(&mut window, flags) {
            log::debug!("{id}: started in {outcome:?} mode");
        }
        log::debug!("Created GLFW {id}");
        Ok(window)
    }

    /// Stop forwarding events for a destroyed window
    pub fn release_window(&mut self, id: WindowId) {
        self.windows.retain(|registration| registration.id != id);
    }

    /// Poll GLFW and push every pending event onto the shared queue
    pub fn pump_events(&mut self) -> usize {
        self.glfw.poll_events();
        self.forward_events()
    }

    /// Block until an event arrives or `timeout` passes, then push every
    /// pending event onto the shared queue
    ///
    /// A zero timeout polls without blocking.
    pub fn wait_events(&mut self, timeout: Duration) -> usize {
        if timeout.is_zero() {
            self.glfw.poll_events();
        } else {
            self.glfw.wait_events_timeout(timeout.as_secs_f64());
        }
        self.forward_events()
    }

    fn forward_events(&mut self) -> usize {
        let queue = &self.queue;
        let mut pushed = 0;
        for registration in &mut self.windows {
            let id = registration.id;
            for (_, event) in glfw::flush_messages(&registration.events) {
                convert_event(id, &mut registration.cursor, event, &mut |raw| {
                    queue.push_event(raw);
                    pushed += 1;
                });
            }
        }
        pushed
    }
}

const fn host_button(button: glfw::MouseButton) -> u8 {
    match button {
        glfw::MouseButton::Button1 => 1,
        glfw::MouseButton::Button2 => 3,
        glfw::MouseButton::Button3 => 2,
        glfw::MouseButton::Button4 => 4,
        glfw::MouseButton::Button5 => 5,
        glfw::MouseButton::Button6 => 6,
        glfw::MouseButton::Button7 => 7,
        glfw::MouseButton::Button8 => 8,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn convert_event(
    window: WindowId,
    cursor: &mut (f64, f64),
    event: WindowEvent,
    emit: &mut dyn FnMut(RawEvent),
) {
    let state = |event: WindowEventKind| RawEvent::Window { window, event };

    match event {
        WindowEvent::Pos(x, y) => emit(state(WindowEventKind::Moved { x, y })),
        WindowEvent::Size(width, height) => emit(state(WindowEventKind::Resized { width, height })),
        WindowEvent::FramebufferSize(width, height) => {
            emit(state(WindowEventKind::PixelSizeChanged { width, height }));
        }
        WindowEvent::Close => emit(state(WindowEventKind::CloseRequested)),
        WindowEvent::Refresh => emit(state(WindowEventKind::Exposed)),
        WindowEvent::Focus(true) => emit(state(WindowEventKind::FocusGained)),
        WindowEvent::Focus(false) => emit(state(WindowEventKind::FocusLost)),
        WindowEvent::Iconify(true) => emit(state(WindowEventKind::Minimized)),
        WindowEvent::Iconify(false) | WindowEvent::Maximize(false) => {
            emit(state(WindowEventKind::Restored));
        }
        WindowEvent::Maximize(true) => emit(state(WindowEventKind::Maximized)),
        WindowEvent::CursorEnter(true) => emit(state(WindowEventKind::MouseEnter)),
        WindowEvent::CursorEnter(false) => emit(state(WindowEventKind::MouseLeave)),
        WindowEvent::ContentScale(..) => emit(state(WindowEventKind::DisplayScaleChanged)),

        WindowEvent::Key(_, scancode, action, _) => emit(RawEvent::Key {
            window,
            scancode: u32::try_from(scancode).unwrap_or(0),
            down: action != Action::Release,
            repeat: action == Action::Repeat,
        }),
        WindowEvent::CursorPos(x, y) => {
            *cursor = (x, y);
            emit(RawEvent::MouseMotion {
                window,
                which: 0,
                x: x as f32,
                y: y as f32,
            });
        }
        WindowEvent::MouseButton(button, action, _) => emit(RawEvent::MouseButton {
            window,
            which: 0,
            button: host_button(button),
            down: action != Action::Release,
            x: cursor.0 as f32,
            y: cursor.1 as f32,
        }),
        WindowEvent::Scroll(dx, dy) => emit(RawEvent::MouseWheel {
            window,
            which: 0,
            dx: dx as f32,
            dy: dy as f32,
        }),
        WindowEvent::Char(c) => emit(RawEvent::TextInput {
            window,
            text: c.to_string(),
        }),
        WindowEvent::FileDrop(paths) => {
            emit(RawEvent::Drop {
                window,
                payload: DropPayload::Begin,
            });
            for path in paths {
                emit(RawEvent::Drop {
                    window,
                    payload: DropPayload::File(path),
                });
            }
            emit(RawEvent::Drop {
                window,
                payload: DropPayload::Complete,
            });
        }
        _ => {}
    }
}

/// A GLFW window
pub struct GlfwWindow {
    glfw: Glfw,
    window: PWindow,
    id: WindowId,
    /// Layer attached to the content view, kept alive with the window
    #[cfg(target_os = "macos")]
    metal_layer: Option<raw_window_metal::Layer>,
}

impl GlfwWindow {
    fn raw_handles(&self) -> Option<(RawWindowHandle, RawDisplayHandle)> {
        let window = self.window.window_handle().ok()?.as_raw();
        let display = self.window.display_handle().ok()?.as_raw();
        Some((window, display))
    }
}

/// Attach a `CAMetalLayer` to an `NSView`, or reuse the one it already has
#[cfg(target_os = "macos")]
#[allow(unsafe_code)]
fn attach_metal_layer(ns_view: NonNull<c_void>) -> raw_window_metal::Layer {
    // SAFETY: `ns_view` is the content view of a live GLFW window, and GLFW
    // windows are only driven from the main thread.
    unsafe { raw_window_metal::Layer::from_ns_view(ns_view) }
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl HostWindow for GlfwWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (to_u32(width), to_u32(height))
    }

    fn size_in_pixels(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (to_u32(width), to_u32(height))
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_minimum_size(&mut self, width: u32, height: u32) {
        self.window
            .set_size_limits(Some(width), Some(height), None, None);
    }

    fn set_fullscreen(&mut self, mode: FullscreenMode) -> Result<(), HostError> {
        let window = &mut self.window;
        self.glfw.with_primary_monitor(|_, monitor| -> Result<(), HostError> {
            let monitor = monitor.ok_or_else(|| HostError::Rejected {
                operation: "set_fullscreen",
                reason: "no primary monitor".into(),
            })?;
            let video_mode = match mode {
                FullscreenMode::Exclusive => monitor
                    .get_video_modes()
                    .into_iter()
                    .max_by_key(|m| (u64::from(m.width) * u64::from(m.height), m.refresh_rate)),
                FullscreenMode::Borderless => monitor.get_video_mode(),
            }
            .ok_or_else(|| HostError::Rejected {
                operation: "set_fullscreen",
                reason: "monitor reports no video mode".into(),
            })?;

            window.set_monitor(
                glfw::WindowMode::FullScreen(&*monitor),
                0,
                0,
                video_mode.width,
                video_mode.height,
                Some(video_mode.refresh_rate),
            );
            Ok(())
        })?;

        let fullscreen = self
            .window
            .with_window_mode(|mode| matches!(mode, glfw::WindowMode::FullScreen(_)));
        if fullscreen {
            Ok(())
        } else {
            Err(HostError::Rejected {
                operation: "set_fullscreen",
                reason: "window stayed windowed".into(),
            })
        }
    }

    fn maximize(&mut self) {
        self.window.maximize();
    }

    fn hide_cursor(&mut self) {
        self.window.set_cursor_mode(glfw::CursorMode::Hidden);
    }

    fn video_driver(&self) -> Option<String> {
        let (_, display) = self.raw_handles()?;
        let name = match display {
            RawDisplayHandle::Xlib(_) | RawDisplayHandle::Xcb(_) => "x11",
            RawDisplayHandle::Wayland(_) => "wayland",
            RawDisplayHandle::Windows(_) => "windows",
            RawDisplayHandle::AppKit(_) => "cocoa",
            RawDisplayHandle::Android(_) => "android",
            _ => return None,
        };
        Some(name.to_owned())
    }

    fn native_property(&self, property: NativeProperty) -> Option<NativeValue> {
        let (window, display) = self.raw_handles()?;
        match (property, window, display) {
            (NativeProperty::Win32Hwnd, RawWindowHandle::Win32(handle), _) => {
                NonNull::new(handle.hwnd.get() as *mut c_void).map(NativeValue::Pointer)
            }
            (NativeProperty::X11Display, _, RawDisplayHandle::Xlib(handle)) => {
                handle.display.map(NativeValue::Pointer)
            }
            (NativeProperty::X11Window, RawWindowHandle::Xlib(handle), _) => {
                Some(NativeValue::Number(u64::from(handle.window)))
            }
            (NativeProperty::WaylandDisplay, _, RawDisplayHandle::Wayland(handle)) => {
                Some(NativeValue::Pointer(handle.display))
            }
            (NativeProperty::WaylandSurface, RawWindowHandle::Wayland(handle), _) => {
                Some(NativeValue::Pointer(handle.surface))
            }
            (NativeProperty::AndroidSurface, RawWindowHandle::AndroidNdk(handle), _) => {
                Some(NativeValue::Pointer(handle.a_native_window))
            }
            _ => None,
        }
    }

    #[cfg(target_os = "macos")]
    fn create_metal_layer(&mut self) -> Option<NonNull<c_void>> {
        if let Some(layer) = &self.metal_layer {
            return Some(layer.as_ptr());
        }
        let Some((RawWindowHandle::AppKit(handle), _)) = self.raw_handles() else {
            log::error!("{}: no AppKit view to attach a Metal layer to", self.id);
            return None;
        };
        let layer = attach_metal_layer(handle.ns_view);
        let pointer = layer.as_ptr();
        self.metal_layer = Some(layer);
        Some(pointer)
    }

    #[cfg(not(target_os = "macos"))]
    fn create_metal_layer(&mut self) -> Option<NonNull<c_void>> {
        log::error!("{}: Metal layers exist only on macOS", self.id);
        None
    }

    fn present_frames(&mut self, _frames: &[Frame]) -> Result<(), HostError> {
        Err(HostError::Unsupported("software presentation"))
    }
}

impl Drop for GlfwWindow {
    fn drop(&mut self) {
        self.window.set_should_close(true);
        log::debug!("Destroying GLFW {}", self.id);
    }
}
