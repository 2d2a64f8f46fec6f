//! cpal audio host
//!
//! Opens pull-callback output streams through the platform's default cpal
//! host (WASAPI, CoreAudio, ALSA, ...). Devices are identified by name.
//! Streams run interleaved stereo; devices that only take `f32` samples get
//! their buffers converted from `i16` on the audio thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};

use super::{AudioHost, DeviceInfo, OutputStream, RenderCallback};
use crate::audio::{AudioError, DeviceSelector, StreamFormat};

/// Audio host backed by cpal's default host
pub struct CpalHost {
    host: cpal::Host,
}

impl CpalHost {
    /// Use the platform's default cpal host
    pub fn new() -> Self {
        let host = cpal::default_host();
        log::debug!("Using cpal host {:?}", host.id());
        Self { host }
    }

    fn find_device(&self, selector: &DeviceSelector) -> Result<cpal::Device, AudioError> {
        match selector {
            DeviceSelector::SystemDefault => self
                .host
                .default_output_device()
                .ok_or(AudioError::NoDefaultDevice),
            DeviceSelector::Named(wanted) => self
                .host
                .output_devices()
                .map_err(|e| AudioError::Enumeration(e.to_string()))?
                .find(|device| device.name().map_or(false, |name| name == *wanted))
                .ok_or_else(|| AudioError::DeviceNotFound(wanted.clone())),
        }
    }
}

impl Default for CpalHost {
    fn default() -> Self {
        Self::new()
    }
}

fn pick(
    ranges: &[SupportedStreamConfigRange],
    format: SampleFormat,
    rate: SampleRate,
) -> Option<&SupportedStreamConfigRange> {
    ranges.iter().find(|range| {
        range.sample_format() == format
            && range.min_sample_rate() <= rate
            && rate <= range.max_sample_rate()
    })
}

/// Stereo configuration at the desired rate if supported, else at the
/// device's default rate; `i16` preferred over `f32`
fn choose_config(
    device: &cpal::Device,
    desired: StreamFormat,
) -> Result<(StreamConfig, SampleFormat), AudioError> {
    let ranges: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?
        .filter(|range| range.channels() == desired.channels)
        .collect();

    let mut rates = vec![SampleRate(desired.sample_rate)];
    if let Ok(default) = device.default_output_config() {
        rates.push(default.sample_rate());
    }

    for rate in rates {
        for format in [SampleFormat::I16, SampleFormat::F32] {
            if let Some(range) = pick(&ranges, format, rate) {
                return Ok((range.clone().with_sample_rate(rate).config(), format));
            }
        }
    }

    Err(AudioError::UnsupportedFormat(format!(
        "no {}-channel i16/f32 configuration at {} Hz or the device default rate",
        desired.channels, desired.sample_rate
    )))
}

/// Samples converted per render call on the `f32` path when the device
/// buffer size is not fixed
pub const CONVERSION_CHUNK_SAMPLES: usize = 16384;

/// Size of the `i16` conversion buffer, allocated before the stream starts
///
/// Covers a whole device buffer when its size is fixed; larger buffers are
/// rendered in whole-frame chunks.
fn conversion_buffer_len(config: &StreamConfig) -> usize {
    let channels = usize::from(config.channels.max(1));
    let samples = match config.buffer_size {
        BufferSize::Fixed(frames) => usize::try_from(frames)
            .unwrap_or(CONVERSION_CHUNK_SAMPLES)
            .saturating_mul(channels),
        BufferSize::Default => CONVERSION_CHUNK_SAMPLES,
    };
    // Whole frames only, so every chunk starts on the left channel.
    (samples / channels).max(1) * channels
}

impl AudioHost for CpalHost {
    fn open_output_stream(
        &self,
        desired: StreamFormat,
        selector: &DeviceSelector,
        mut render: RenderCallback,
    ) -> Result<(Box<dyn OutputStream>, StreamFormat), AudioError> {
        let device = self.find_device(selector)?;
        let (config, sample_format) = choose_config(&device, desired)?;
        let error_callback = |err: cpal::StreamError| log::error!("Audio stream error: {err}");

        let stream = match sample_format {
            SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| render(data),
                error_callback,
                None,
            ),
            _ => {
                let mut scratch = vec![0i16; conversion_buffer_len(&config)];
                device.build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        for chunk in data.chunks_mut(scratch.len()) {
                            let samples = &mut scratch[..chunk.len()];
                            render(samples);
                            for (out, sample) in chunk.iter_mut().zip(samples.iter()) {
                                *out = f32::from(*sample) / 32768.0;
                            }
                        }
                    },
                    error_callback,
                    None,
                )
            }
        }
        .map_err(|e| AudioError::StreamOpen(e.to_string()))?;

        // Some platforms start streams on creation.
        let _ = stream.pause();

        let obtained = StreamFormat {
            sample_rate: config.sample_rate.0,
            channels: config.channels,
        };
        Ok((Box::new(CpalStream { stream }), obtained))
    }

    fn output_devices(&self) -> Result<Vec<DeviceInfo>, AudioError> {
        let devices = self
            .host
            .output_devices()
            .map_err(|e| AudioError::Enumeration(e.to_string()))?;
        Ok(devices
            .filter_map(|device| device.name().ok())
            .map(|name| DeviceInfo {
                id: name.clone(),
                name,
            })
            .collect())
    }
}

/// Open cpal output stream
pub struct CpalStream {
    stream: cpal::Stream,
}

impl OutputStream for CpalStream {
    fn start(&mut self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::Playback(e.to_string()))
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::Playback(e.to_string()))
    }
}
