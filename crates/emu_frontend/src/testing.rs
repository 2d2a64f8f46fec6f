//! Scripted host doubles for unit tests

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::audio::{
    AudioError, AudioHost, DeviceInfo, DeviceSelector, OutputStream, RenderCallback, StreamFormat,
};
use crate::emulation::{EmulationCore, PerfStats};
use crate::events::WindowId;
use crate::input::{InputEvent, InputSink};
use crate::surface::{NativeProperty, NativeValue};
use crate::window::{Frame, FrameSource, FullscreenMode, HostError, HostWindow};

/// Non-null pointer with a recognizable address; never dereferenced
pub fn fake_pointer(address: usize) -> NonNull<c_void> {
    NonNull::new(address as *mut c_void).expect("fake pointer address must be non-zero")
}

/// Everything a [`MockWindow`] was asked to do, plus its scripted answers
#[derive(Debug)]
pub struct MockWindowState {
    pub id: WindowId,
    pub size: (u32, u32),
    pub pixel_size: (u32, u32),
    pub titles: Vec<String>,
    pub min_size: Option<(u32, u32)>,
    pub fullscreen_attempts: Vec<FullscreenMode>,
    pub failing_modes: Vec<FullscreenMode>,
    pub fullscreen: Option<FullscreenMode>,
    pub maximized: bool,
    pub cursor_hidden: bool,
    pub driver: Option<String>,
    pub properties: HashMap<NativeProperty, NativeValue>,
    pub metal_layer: Option<NonNull<c_void>>,
    pub metal_layers_created: usize,
    pub presented: Vec<Vec<Frame>>,
}

/// Host window double; clones share state so tests can inspect a window
/// owned by a controller
#[derive(Clone)]
pub struct MockWindow {
    state: Arc<Mutex<MockWindowState>>,
}

impl MockWindow {
    /// A 400x480 window with no native properties
    pub fn new(id: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockWindowState {
                id: WindowId(id),
                size: (400, 480),
                pixel_size: (400, 480),
                titles: Vec::new(),
                min_size: None,
                fullscreen_attempts: Vec::new(),
                failing_modes: Vec::new(),
                fullscreen: None,
                maximized: false,
                cursor_hidden: false,
                driver: None,
                properties: HashMap::new(),
                metal_layer: None,
                metal_layers_created: 0,
                presented: Vec::new(),
            })),
        }
    }

    pub fn with_property(self, property: NativeProperty, value: NativeValue) -> Self {
        self.state.lock().properties.insert(property, value);
        self
    }

    pub fn with_driver(self, driver: &str) -> Self {
        self.state.lock().driver = Some(driver.to_owned());
        self
    }

    pub fn with_metal_layer(self, layer: NonNull<c_void>) -> Self {
        self.state.lock().metal_layer = Some(layer);
        self
    }

    /// Properties for every supported platform, so resolution succeeds
    /// wherever the tests run
    pub fn with_native_surface(self) -> Self {
        self.with_driver("x11")
            .with_property(NativeProperty::X11Display, NativeValue::Pointer(fake_pointer(0x10)))
            .with_property(NativeProperty::X11Window, NativeValue::Number(0x20))
            .with_property(NativeProperty::Win32Hwnd, NativeValue::Pointer(fake_pointer(0x30)))
            .with_property(
                NativeProperty::AndroidSurface,
                NativeValue::Pointer(fake_pointer(0x40)),
            )
            .with_metal_layer(fake_pointer(0x50))
    }

    pub fn failing_fullscreen(self, modes: &[FullscreenMode]) -> Self {
        self.state.lock().failing_modes.extend_from_slice(modes);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockWindowState> {
        self.state.lock()
    }
}

impl HostWindow for MockWindow {
    fn id(&self) -> WindowId {
        self.state.lock().id
    }

    fn size(&self) -> (u32, u32) {
        self.state.lock().size
    }

    fn size_in_pixels(&self) -> (u32, u32) {
        self.state.lock().pixel_size
    }

    fn set_title(&mut self, title: &str) {
        self.state.lock().titles.push(title.to_owned());
    }

    fn set_minimum_size(&mut self, width: u32, height: u32) {
        self.state.lock().min_size = Some((width, height));
    }

    fn set_fullscreen(&mut self, mode: FullscreenMode) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.fullscreen_attempts.push(mode);
        if state.failing_modes.contains(&mode) {
            return Err(HostError::Rejected {
                operation: "set_fullscreen",
                reason: "simulated failure".into(),
            });
        }
        state.fullscreen = Some(mode);
        Ok(())
    }

    fn maximize(&mut self) {
        self.state.lock().maximized = true;
    }

    fn hide_cursor(&mut self) {
        self.state.lock().cursor_hidden = true;
    }

    fn video_driver(&self) -> Option<String> {
        self.state.lock().driver.clone()
    }

    fn native_property(&self, property: NativeProperty) -> Option<NativeValue> {
        self.state.lock().properties.get(&property).copied()
    }

    fn create_metal_layer(&mut self) -> Option<NonNull<c_void>> {
        let mut state = self.state.lock();
        state.metal_layers_created += 1;
        state.metal_layer
    }

    fn present_frames(&mut self, frames: &[Frame]) -> Result<(), HostError> {
        self.state.lock().presented.push(frames.to_vec());
        Ok(())
    }
}

/// Frame source that always returns the same frames
pub struct StaticFrames(pub Vec<Frame>);

impl FrameSource for StaticFrames {
    fn latest_frames(&self) -> Vec<Frame> {
        self.0.clone()
    }
}

/// Input sink recording every event; clones share the record
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<InputEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl InputSink for RecordingSink {
    fn on_input(&mut self, event: InputEvent) {
        self.events.lock().push(event);
    }
}

/// Core reporting fixed counters
pub struct FixedCore {
    stats: PerfStats,
}

impl FixedCore {
    pub const fn new(stats: PerfStats) -> Self {
        Self { stats }
    }
}

impl EmulationCore for FixedCore {
    fn perf_stats(&self) -> PerfStats {
        self.stats
    }

    fn is_running(&self) -> bool {
        true
    }

    fn title(&self) -> String {
        "Test Title".to_owned()
    }
}

/// What a [`MockAudioHost`] was asked to do
#[derive(Default)]
pub struct MockAudioState {
    pub requested: Option<StreamFormat>,
    pub selector: Option<DeviceSelector>,
    pub playing: bool,
    pub destroyed: bool,
    /// Whether the sink still answered when the stream was destroyed
    pub sink_present_at_destroy: bool,
    render: Option<RenderCallback>,
}

/// Audio host double that keeps the render callback so tests can play the
/// real-time thread
#[derive(Clone)]
pub struct MockAudioHost {
    rate: u32,
    fail: bool,
    devices: Vec<DeviceInfo>,
    state: Arc<Mutex<MockAudioState>>,
}

impl MockAudioHost {
    /// Host whose devices run at `rate`
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            fail: false,
            devices: Vec::new(),
            state: Arc::new(Mutex::new(MockAudioState::default())),
        }
    }

    /// Host where opening and enumeration fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }

    pub fn with_devices(mut self, devices: Vec<DeviceInfo>) -> Self {
        self.devices = devices;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockAudioState> {
        self.state.lock()
    }

    /// Invoke the render callback like the device thread would; does nothing
    /// once the stream is destroyed
    pub fn render(&self, buffer: &mut [i16]) {
        if let Some(render) = self.state.lock().render.as_mut() {
            render(buffer);
        }
    }
}

impl AudioHost for MockAudioHost {
    fn open_output_stream(
        &self,
        desired: StreamFormat,
        selector: &DeviceSelector,
        render: RenderCallback,
    ) -> Result<(Box<dyn OutputStream>, StreamFormat), AudioError> {
        let mut state = self.state.lock();
        state.requested = Some(desired);
        state.selector = Some(selector.clone());
        if self.fail {
            return Err(AudioError::StreamOpen("simulated failure".into()));
        }
        state.render = Some(render);
        let stream = MockStream {
            state: Arc::clone(&self.state),
        };
        Ok((Box::new(stream), StreamFormat::stereo(self.rate)))
    }

    fn output_devices(&self) -> Result<Vec<DeviceInfo>, AudioError> {
        if self.fail {
            return Err(AudioError::Enumeration("simulated failure".into()));
        }
        Ok(self.devices.clone())
    }
}

struct MockStream {
    state: Arc<Mutex<MockAudioState>>,
}

impl OutputStream for MockStream {
    fn start(&mut self) -> Result<(), AudioError> {
        self.state.lock().playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.state.lock().playing = false;
        Ok(())
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.destroyed = true;
        state.playing = false;
        // Last callback the host may make; none follow once the stream is gone.
        let mut last = [0i16; 2];
        if let Some(mut render) = state.render.take() {
            render(&mut last);
        }
        state.sink_present_at_destroy = last.iter().any(|sample| *sample != 0);
    }
}
