//! Audio host implementations
//!
//! Platform-independent abstraction over pull-callback audio libraries.

#[cfg(feature = "cpal")]
pub mod cpal_backend;

use super::{AudioError, DeviceSelector, StreamFormat};

/// Fills one device buffer of interleaved samples
///
/// Runs on the host's real-time audio thread.
pub type RenderCallback = Box<dyn FnMut(&mut [i16]) + Send + 'static>;

/// Output device as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Identifier accepted by [`DeviceSelector::Named`]
    pub id: String,
    /// Human-readable name
    pub name: String,
}

/// Host audio subsystem
pub trait AudioHost {
    /// Open a paused output stream driving `render`
    ///
    /// Returns the stream together with the format the device actually
    /// runs at, which may differ from `desired`.
    fn open_output_stream(
        &self,
        desired: StreamFormat,
        selector: &DeviceSelector,
        render: RenderCallback,
    ) -> Result<(Box<dyn OutputStream>, StreamFormat), AudioError>;

    /// List output devices
    fn output_devices(&self) -> Result<Vec<DeviceInfo>, AudioError>;
}

/// An open device stream
///
/// Dropping the stream destroys it; once `drop` returns the host makes no
/// further render callbacks.
pub trait OutputStream {
    /// Start or resume pulling samples
    fn start(&mut self) -> Result<(), AudioError>;

    /// Pause pulling samples
    fn stop(&mut self) -> Result<(), AudioError>;
}
