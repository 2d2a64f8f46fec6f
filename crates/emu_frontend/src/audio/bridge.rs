//! Pull-to-push audio bridge

use std::sync::Arc;

use parking_lot::Mutex;

use super::backend::{AudioHost, OutputStream, RenderCallback};
use super::{AudioError, DeviceSelector, StreamFormat, CHANNELS, NATIVE_SAMPLE_RATE};
use crate::config::AudioConfig;

/// Receives each device buffer together with its frame count
///
/// Called on the real-time audio thread: must not block or allocate.
pub type AudioSink = Box<dyn FnMut(&mut [i16], usize) + Send + 'static>;

/// Most recently registered sink, shared with the render callback
type SinkSlot = Mutex<Option<AudioSink>>;

/// Owns the device stream and forwards its callbacks to a sink
///
/// Opening never fails fatally: without a stream the bridge reports
/// [`NATIVE_SAMPLE_RATE`] and playback controls do nothing.
pub struct AudioBridge {
    stream: Option<Box<dyn OutputStream>>,
    format: Option<StreamFormat>,
    slot: Arc<SinkSlot>,
}

impl AudioBridge {
    /// Bridge without a device
    pub fn disabled() -> Self {
        Self {
            stream: None,
            format: None,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Open and start an output stream
    ///
    /// # Errors
    /// Returns the host's error if the device cannot be opened or started.
    pub fn try_open(
        host: &dyn AudioHost,
        selector: &DeviceSelector,
        desired: StreamFormat,
    ) -> Result<Self, AudioError> {
        let slot: Arc<SinkSlot> = Arc::new(Mutex::new(None));
        let render = render_callback(Arc::clone(&slot));

        let (mut stream, obtained) = host.open_output_stream(desired, selector, render)?;
        // Hosts hand out paused streams.
        stream.start()?;

        log::info!(
            "Opened audio output on {selector}: {} Hz, {} channels",
            obtained.sample_rate,
            obtained.channels
        );
        Ok(Self {
            stream: Some(stream),
            format: Some(obtained),
            slot,
        })
    }

    /// Open and start an output stream, staying silent on failure
    pub fn open(host: &dyn AudioHost, selector: &DeviceSelector, desired: StreamFormat) -> Self {
        Self::try_open(host, selector, desired).unwrap_or_else(|err| {
            log::error!("Audio output unavailable, continuing without sound: {err}");
            Self::disabled()
        })
    }

    /// Open the device and rate named in the configuration
    pub fn from_config(host: &dyn AudioHost, config: &AudioConfig) -> Self {
        let selector = DeviceSelector::from_setting(&config.output_device);
        Self::open(host, &selector, StreamFormat::stereo(config.sample_rate))
    }

    /// Whether a device stream is open
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Register the sink fed by every device callback, replacing any previous one
    ///
    /// Do not rebind while audio is playing; a callback that races the swap
    /// outputs silence.
    pub fn set_sink<F>(&self, sink: F)
    where
        F: FnMut(&mut [i16], usize) + Send + 'static,
    {
        *self.slot.lock() = Some(Box::new(sink));
    }

    /// Remove the sink; callbacks output silence
    pub fn clear_sink(&self) {
        self.slot.lock().take();
    }

    /// Sample rate the device runs at, or [`NATIVE_SAMPLE_RATE`] without a device
    pub fn native_sample_rate(&self) -> u32 {
        self.format
            .map_or(NATIVE_SAMPLE_RATE, |format| format.sample_rate)
    }

    /// Pause the device
    pub fn pause(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            if let Err(err) = stream.stop() {
                log::warn!("Failed to pause audio output: {err}");
            }
        }
    }

    /// Resume the device
    pub fn resume(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            if let Err(err) = stream.start() {
                log::warn!("Failed to resume audio output: {err}");
            }
        }
    }
}

impl Drop for AudioBridge {
    fn drop(&mut self) {
        // The stream goes first so no callback can reach the sink afterwards.
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.stop();
            drop(stream);
        }
        self.slot.lock().take();
    }
}

impl std::fmt::Debug for AudioBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBridge")
            .field("open", &self.is_open())
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Real-time callback: hands the buffer to the sink, or writes silence
fn render_callback(slot: Arc<SinkSlot>) -> RenderCallback {
    Box::new(move |buffer: &mut [i16]| {
        let frames = buffer.len() / usize::from(CHANNELS);
        if let Some(mut guard) = slot.try_lock() {
            if let Some(sink) = guard.as_mut() {
                sink(buffer, frames);
                return;
            }
        }
        buffer.fill(0);
    })
}

/// Ids of the host's output devices; empty if they cannot be listed
pub fn list_output_devices(host: &dyn AudioHost) -> Vec<String> {
    match host.output_devices() {
        Ok(devices) => devices.into_iter().map(|device| device.id).collect(),
        Err(err) => {
            log::error!("{err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::DeviceInfo;
    use crate::testing::MockAudioHost;

    fn open_default(host: &MockAudioHost) -> AudioBridge {
        AudioBridge::open(host, &DeviceSelector::SystemDefault, StreamFormat::default())
    }

    fn pattern(buffer: &mut [i16], frames: usize) {
        for frame in 0..frames {
            let value = i16::try_from(frame % 1000).unwrap();
            buffer[frame * 2] = value;
            buffer[frame * 2 + 1] = -value;
        }
    }

    #[test]
    fn test_callback_forwards_exact_frame_count() {
        let host = MockAudioHost::new(48_000);
        let bridge = open_default(&host);
        let frames_seen = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&frames_seen);
        bridge.set_sink(move |buffer, frames| {
            seen.lock().push(frames);
            pattern(buffer, frames);
        });

        let mut buffer = vec![7i16; 512];
        host.render(&mut buffer);
        assert_eq!(*frames_seen.lock(), vec![256]);
        assert_eq!(buffer[0], 0);
        assert_eq!(buffer[2], 1);
        assert_eq!(buffer[511], -255);

        for size in [64, 1024, 2] {
            let mut buffer = vec![0i16; size];
            host.render(&mut buffer);
        }
        assert_eq!(*frames_seen.lock(), vec![256, 32, 512, 1]);
    }

    #[test]
    fn test_stream_starts_and_reports_obtained_rate() {
        let host = MockAudioHost::new(48_000);
        let bridge = open_default(&host);
        assert!(bridge.is_open());
        assert_eq!(bridge.native_sample_rate(), 48_000);
        assert!(host.state().playing);
        assert_eq!(host.state().requested, Some(StreamFormat::stereo(NATIVE_SAMPLE_RATE)));
    }

    #[test]
    fn test_no_sink_writes_silence() {
        let host = MockAudioHost::new(NATIVE_SAMPLE_RATE);
        let bridge = open_default(&host);
        let mut buffer = vec![123i16; 64];
        host.render(&mut buffer);
        assert!(buffer.iter().all(|sample| *sample == 0));

        bridge.set_sink(|buffer, _| buffer.fill(1));
        bridge.clear_sink();
        host.render(&mut buffer);
        assert!(buffer.iter().all(|sample| *sample == 0));
    }

    #[test]
    fn test_open_failure_is_silent_and_harmless() {
        let host = MockAudioHost::failing();
        let mut bridge = AudioBridge::open(
            &host,
            &DeviceSelector::Named("missing".into()),
            StreamFormat::default(),
        );
        assert!(!bridge.is_open());
        assert_eq!(bridge.native_sample_rate(), NATIVE_SAMPLE_RATE);
        bridge.set_sink(|buffer, _| buffer.fill(1));
        bridge.resume();
        bridge.pause();
    }

    #[test]
    fn test_try_open_reports_errors() {
        let host = MockAudioHost::failing();
        let result =
            AudioBridge::try_open(&host, &DeviceSelector::SystemDefault, StreamFormat::default());
        assert!(matches!(result, Err(AudioError::StreamOpen(_))));
    }

    #[test]
    fn test_pause_and_resume() {
        let host = MockAudioHost::new(NATIVE_SAMPLE_RATE);
        let mut bridge = open_default(&host);
        bridge.pause();
        assert!(!host.state().playing);
        bridge.resume();
        assert!(host.state().playing);
    }

    #[test]
    fn test_drop_destroys_stream_then_clears_sink() {
        let host = MockAudioHost::new(NATIVE_SAMPLE_RATE);
        let bridge = open_default(&host);
        bridge.set_sink(|buffer, _| buffer.fill(9));
        drop(bridge);

        let state = host.state();
        assert!(state.destroyed);
        assert!(!state.playing);
        assert!(state.sink_present_at_destroy);
        drop(state);

        // No callback reaches anything after teardown
        let mut buffer = vec![5i16; 8];
        host.render(&mut buffer);
        assert!(buffer.iter().all(|sample| *sample == 5));
    }

    #[test]
    fn test_from_config_selects_device() {
        let host = MockAudioHost::new(NATIVE_SAMPLE_RATE);
        let config = AudioConfig {
            output_device: "Speakers".into(),
            sample_rate: 44_100,
        };
        let _bridge = AudioBridge::from_config(&host, &config);
        let state = host.state();
        assert_eq!(state.selector, Some(DeviceSelector::Named("Speakers".into())));
        assert_eq!(state.requested, Some(StreamFormat::stereo(44_100)));
    }

    #[test]
    fn test_list_output_devices() {
        let host = MockAudioHost::new(NATIVE_SAMPLE_RATE).with_devices(vec![
            DeviceInfo {
                id: "hw:0".into(),
                name: "Built-in".into(),
            },
            DeviceInfo {
                id: "hw:1".into(),
                name: "USB".into(),
            },
        ]);
        assert_eq!(list_output_devices(&host), vec!["hw:0".to_owned(), "hw:1".to_owned()]);
        assert!(list_output_devices(&MockAudioHost::failing()).is_empty());
    }
}
