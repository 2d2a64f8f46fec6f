//! Audio output
//!
//! The host audio subsystem pulls samples from a real-time thread; the
//! emulator's mixer wants to push them. [`AudioBridge`] connects the two by
//! handing every device callback's buffer straight to a registered sink,
//! with no buffering in between.
//!
//! All streams are interleaved stereo signed 16-bit.

pub mod backend;
pub mod bridge;

use thiserror::Error;

pub use backend::{AudioHost, DeviceInfo, OutputStream, RenderCallback};
pub use bridge::{list_output_devices, AudioBridge, AudioSink};

/// Nominal sample rate of the emulated hardware, reported when no stream
/// could be opened
pub const NATIVE_SAMPLE_RATE: u32 = 32728;

/// Interleaved channels per frame
pub const CHANNELS: u16 = 2;

/// Device setting that selects the system default output
pub const AUTO_DEVICE_NAME: &str = "auto";

/// Which output device to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Let the host pick
    SystemDefault,
    /// Device id as listed by [`list_output_devices`]
    Named(String),
}

impl DeviceSelector {
    /// Interpret a configuration string: empty or `"auto"` means the system
    /// default, anything else is a device id
    pub fn from_setting(setting: &str) -> Self {
        let setting = setting.trim();
        if setting.is_empty() || setting.eq_ignore_ascii_case(AUTO_DEVICE_NAME) {
            Self::SystemDefault
        } else {
            Self::Named(setting.to_owned())
        }
    }
}

impl std::fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SystemDefault => f.write_str("system default device"),
            Self::Named(name) => write!(f, "device '{name}'"),
        }
    }
}

/// Sample rate and channel count of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Frames per second
    pub sample_rate: u32,
    /// Interleaved channels per frame
    pub channels: u16,
}

impl StreamFormat {
    /// Stereo stream at `sample_rate`
    pub const fn stereo(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: CHANNELS,
        }
    }
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self::stereo(NATIVE_SAMPLE_RATE)
    }
}

/// Audio errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No device matched the selector
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),
    /// The host reports no default output device
    #[error("No default audio output device")]
    NoDefaultDevice,
    /// The device cannot play interleaved stereo i16
    #[error("Unsupported stream format: {0}")]
    UnsupportedFormat(String),
    /// The host failed to open the stream
    #[error("Failed to open audio stream: {0}")]
    StreamOpen(String),
    /// Starting or stopping playback failed
    #[error("Audio playback failed: {0}")]
    Playback(String),
    /// Listing devices failed
    #[error("Failed to enumerate audio devices: {0}")]
    Enumeration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_selector_from_setting() {
        assert_eq!(DeviceSelector::from_setting(""), DeviceSelector::SystemDefault);
        assert_eq!(DeviceSelector::from_setting("auto"), DeviceSelector::SystemDefault);
        assert_eq!(DeviceSelector::from_setting(" Auto "), DeviceSelector::SystemDefault);
        assert_eq!(
            DeviceSelector::from_setting("USB Headset"),
            DeviceSelector::Named("USB Headset".into())
        );
    }

    #[test]
    fn test_default_format_is_native_stereo() {
        let format = StreamFormat::default();
        assert_eq!(format.sample_rate, NATIVE_SAMPLE_RATE);
        assert_eq!(format.channels, 2);
    }
}
