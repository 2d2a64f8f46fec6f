//! Native rendering surface resolution
//!
//! A graphics backend creating a swapchain needs different native handles on
//! every platform. [`resolve`] detects the window system at runtime, picks
//! the matching [`NativeSurfaceProvider`] and asks it to turn a
//! [`HostWindow`] into a [`SurfaceDescriptor`]:
//!
//! | Window system | connection         | surface                     |
//! |---------------|--------------------|-----------------------------|
//! | Windows       | none               | `HWND`                      |
//! | X11           | `Display*`         | X window id                 |
//! | Wayland       | `wl_display*`      | `wl_surface*`               |
//! | macOS         | none               | `CAMetalLayer*` of a new view |
//! | Android       | none               | native window surface       |
//!
//! Resolution happens once per window. An unsupported platform is the one
//! fatal condition in the frontend: see [`resolve_or_exit`].

use std::ffi::c_void;
use std::num::NonZeroIsize;
use std::ptr::NonNull;

use raw_window_handle::{
    AndroidDisplayHandle, AndroidNdkWindowHandle, AppKitDisplayHandle, RawDisplayHandle,
    RawWindowHandle, WaylandDisplayHandle, WaylandWindowHandle, Win32WindowHandle,
    WindowsDisplayHandle, XlibDisplayHandle, XlibWindowHandle,
};
use thiserror::Error;

use crate::window::HostWindow;

/// Window systems a surface can be resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSystem {
    /// Win32
    Windows,
    /// Xlib
    X11,
    /// Wayland
    Wayland,
    /// Cocoa with a Metal layer
    MacOS,
    /// Android native window
    Android,
}

impl WindowSystem {
    /// Detect the window system from an OS name (as in
    /// [`std::env::consts::OS`]) and the host's active video driver
    ///
    /// Unix desktops need the driver to tell X11 and Wayland apart.
    pub fn detect(os: &str, video_driver: Option<&str>) -> Result<Self, SurfaceError> {
        match os {
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::MacOS),
            "android" => Ok(Self::Android),
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => match video_driver {
                Some("x11") => Ok(Self::X11),
                Some("wayland") => Ok(Self::Wayland),
                other => Err(SurfaceError::UnsupportedVideoDriver {
                    os: os.to_owned(),
                    driver: other.unwrap_or("none").to_owned(),
                }),
            },
            other => Err(SurfaceError::UnsupportedPlatform(other.to_owned())),
        }
    }

    /// Detect the window system this process runs on
    pub fn detect_current(video_driver: Option<&str>) -> Result<Self, SurfaceError> {
        Self::detect(std::env::consts::OS, video_driver)
    }
}

impl std::fmt::Display for WindowSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Windows => "Windows",
            Self::X11 => "X11",
            Self::Wayland => "Wayland",
            Self::MacOS => "macOS",
            Self::Android => "Android",
        };
        f.write_str(name)
    }
}

/// Platform-specific window properties a host can be queried for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeProperty {
    /// `HWND` pointer
    Win32Hwnd,
    /// Xlib `Display*`
    X11Display,
    /// Xlib `Window` number
    X11Window,
    /// `wl_display*`
    WaylandDisplay,
    /// `wl_surface*`
    WaylandSurface,
    /// Android native window pointer
    AndroidSurface,
}

/// Value of a native window property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeValue {
    /// Pointer-typed property
    Pointer(NonNull<c_void>),
    /// Number-typed property
    Number(u64),
}

impl NativeValue {
    /// The pointer, if this is a pointer property
    pub const fn as_pointer(self) -> Option<NonNull<c_void>> {
        match self {
            Self::Pointer(ptr) => Some(ptr),
            Self::Number(_) => None,
        }
    }

    /// The number, if this is a number property
    pub const fn as_number(self) -> Option<u64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Pointer(_) => None,
        }
    }
}

/// Handle the graphics backend renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceHandle {
    /// Pointer to a native surface object
    Pointer(NonNull<c_void>),
    /// X11 window id
    XWindow(u64),
}

/// How a graphics backend should create a rendering surface for one window
///
/// Immutable once resolved; a recreated window needs a new descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    system: WindowSystem,
    connection: Option<NonNull<c_void>>,
    surface: SurfaceHandle,
}

impl SurfaceDescriptor {
    /// Create a descriptor
    pub const fn new(
        system: WindowSystem,
        connection: Option<NonNull<c_void>>,
        surface: SurfaceHandle,
    ) -> Self {
        Self {
            system,
            connection,
            surface,
        }
    }

    /// Window system tag
    pub const fn system(&self) -> WindowSystem {
        self.system
    }

    /// Display connection (X11 and Wayland only)
    pub const fn connection(&self) -> Option<NonNull<c_void>> {
        self.connection
    }

    /// Render surface
    pub const fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    /// The surface as a `raw-window-handle` window handle
    ///
    /// `None` on macOS, where the surface is a `CAMetalLayer` rather than a
    /// view; pass [`SurfaceDescriptor::surface`] to the Metal path instead.
    pub fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        match (self.system, self.surface) {
            (WindowSystem::Windows, SurfaceHandle::Pointer(hwnd)) => {
                NonZeroIsize::new(hwnd.as_ptr() as isize)
                    .map(|hwnd| RawWindowHandle::Win32(Win32WindowHandle::new(hwnd)))
            }
            (WindowSystem::X11, SurfaceHandle::XWindow(window)) => {
                std::ffi::c_ulong::try_from(window)
                    .ok()
                    .map(|window| RawWindowHandle::Xlib(XlibWindowHandle::new(window)))
            }
            (WindowSystem::Wayland, SurfaceHandle::Pointer(surface)) => {
                Some(RawWindowHandle::Wayland(WaylandWindowHandle::new(surface)))
            }
            (WindowSystem::Android, SurfaceHandle::Pointer(window)) => {
                Some(RawWindowHandle::AndroidNdk(AndroidNdkWindowHandle::new(window)))
            }
            _ => None,
        }
    }

    /// The connection as a `raw-window-handle` display handle
    pub fn raw_display_handle(&self) -> Option<RawDisplayHandle> {
        match self.system {
            WindowSystem::Windows => Some(RawDisplayHandle::Windows(WindowsDisplayHandle::new())),
            WindowSystem::X11 => Some(RawDisplayHandle::Xlib(XlibDisplayHandle::new(
                self.connection,
                0,
            ))),
            WindowSystem::Wayland => self
                .connection
                .map(|display| RawDisplayHandle::Wayland(WaylandDisplayHandle::new(display))),
            WindowSystem::MacOS => Some(RawDisplayHandle::AppKit(AppKitDisplayHandle::new())),
            WindowSystem::Android => Some(RawDisplayHandle::Android(AndroidDisplayHandle::new())),
        }
    }
}

/// Surface resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// No provider exists for this operating system
    #[error("Window manager subsystem for '{0}' not implemented")]
    UnsupportedPlatform(String),
    /// A Unix desktop with neither an X11 nor a Wayland video driver
    #[error("Video driver '{driver}' on {os} not implemented")]
    UnsupportedVideoDriver {
        /// Operating system
        os: String,
        /// Reported video driver
        driver: String,
    },
    /// The host did not provide a required native property
    #[error("{system} window is missing native property {property:?}")]
    MissingProperty {
        /// Window system being resolved
        system: WindowSystem,
        /// Property the host could not provide
        property: NativeProperty,
    },
    /// The host could not create a Metal layer
    #[error("Failed to create a Metal layer for the window")]
    MetalLayerUnavailable,
}

/// Extracts the native handles of one window system
pub trait NativeSurfaceProvider: Sync {
    /// Window system this provider serves
    fn system(&self) -> WindowSystem;

    /// Build the descriptor for `window`
    fn describe(&self, window: &mut dyn HostWindow) -> Result<SurfaceDescriptor, SurfaceError>;
}

fn pointer(
    window: &dyn HostWindow,
    system: WindowSystem,
    property: NativeProperty,
) -> Result<NonNull<c_void>, SurfaceError> {
    window
        .native_property(property)
        .and_then(NativeValue::as_pointer)
        .ok_or(SurfaceError::MissingProperty { system, property })
}

/// `HWND` surface
#[derive(Debug, Clone, Copy)]
pub struct Win32Surface;

impl NativeSurfaceProvider for Win32Surface {
    fn system(&self) -> WindowSystem {
        WindowSystem::Windows
    }

    fn describe(&self, window: &mut dyn HostWindow) -> Result<SurfaceDescriptor, SurfaceError> {
        let hwnd = pointer(window, WindowSystem::Windows, NativeProperty::Win32Hwnd)?;
        Ok(SurfaceDescriptor::new(
            WindowSystem::Windows,
            None,
            SurfaceHandle::Pointer(hwnd),
        ))
    }
}

/// Xlib display and window
#[derive(Debug, Clone, Copy)]
pub struct X11Surface;

impl NativeSurfaceProvider for X11Surface {
    fn system(&self) -> WindowSystem {
        WindowSystem::X11
    }

    fn describe(&self, window: &mut dyn HostWindow) -> Result<SurfaceDescriptor, SurfaceError> {
        let display = pointer(window, WindowSystem::X11, NativeProperty::X11Display)?;
        let xwindow = window
            .native_property(NativeProperty::X11Window)
            .and_then(NativeValue::as_number)
            .filter(|id| *id != 0)
            .ok_or(SurfaceError::MissingProperty {
                system: WindowSystem::X11,
                property: NativeProperty::X11Window,
            })?;
        Ok(SurfaceDescriptor::new(
            WindowSystem::X11,
            Some(display),
            SurfaceHandle::XWindow(xwindow),
        ))
    }
}

/// Wayland display and surface
#[derive(Debug, Clone, Copy)]
pub struct WaylandSurface;

impl NativeSurfaceProvider for WaylandSurface {
    fn system(&self) -> WindowSystem {
        WindowSystem::Wayland
    }

    fn describe(&self, window: &mut dyn HostWindow) -> Result<SurfaceDescriptor, SurfaceError> {
        let display = pointer(window, WindowSystem::Wayland, NativeProperty::WaylandDisplay)?;
        let surface = pointer(window, WindowSystem::Wayland, NativeProperty::WaylandSurface)?;
        Ok(SurfaceDescriptor::new(
            WindowSystem::Wayland,
            Some(display),
            SurfaceHandle::Pointer(surface),
        ))
    }
}

/// Metal layer of a freshly created view
#[derive(Debug, Clone, Copy)]
pub struct MetalSurface;

impl NativeSurfaceProvider for MetalSurface {
    fn system(&self) -> WindowSystem {
        WindowSystem::MacOS
    }

    fn describe(&self, window: &mut dyn HostWindow) -> Result<SurfaceDescriptor, SurfaceError> {
        let layer = window
            .create_metal_layer()
            .ok_or(SurfaceError::MetalLayerUnavailable)?;
        Ok(SurfaceDescriptor::new(
            WindowSystem::MacOS,
            None,
            SurfaceHandle::Pointer(layer),
        ))
    }
}

/// Android native window
#[derive(Debug, Clone, Copy)]
pub struct AndroidSurface;

impl NativeSurfaceProvider for AndroidSurface {
    fn system(&self) -> WindowSystem {
        WindowSystem::Android
    }

    fn describe(&self, window: &mut dyn HostWindow) -> Result<SurfaceDescriptor, SurfaceError> {
        let surface = pointer(window, WindowSystem::Android, NativeProperty::AndroidSurface)?;
        Ok(SurfaceDescriptor::new(
            WindowSystem::Android,
            None,
            SurfaceHandle::Pointer(surface),
        ))
    }
}

/// Provider for a window system
pub fn provider_for(system: WindowSystem) -> &'static dyn NativeSurfaceProvider {
    match system {
        WindowSystem::Windows => &Win32Surface,
        WindowSystem::X11 => &X11Surface,
        WindowSystem::Wayland => &WaylandSurface,
        WindowSystem::MacOS => &MetalSurface,
        WindowSystem::Android => &AndroidSurface,
    }
}

/// Resolve the surface of `window` on the current platform
pub fn resolve(window: &mut dyn HostWindow) -> Result<SurfaceDescriptor, SurfaceError> {
    resolve_on(std::env::consts::OS, window)
}

/// Resolve the surface of `window` as if running on `os`
pub fn resolve_on(
    os: &str,
    window: &mut dyn HostWindow,
) -> Result<SurfaceDescriptor, SurfaceError> {
    let driver = window.video_driver();
    let system = WindowSystem::detect(os, driver.as_deref())?;
    let provider = provider_for(system);
    let descriptor = provider.describe(window)?;
    log::debug!("Resolved {system} surface for {}", window.id());
    Ok(descriptor)
}

/// Resolve the surface of `window`, terminating the process on failure
///
/// No frame can be produced without a surface, so this logs the error and
/// exits with status 1 instead of letting the frontend run broken.
pub fn resolve_or_exit(window: &mut dyn HostWindow) -> SurfaceDescriptor {
    match resolve(window) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    }
}
