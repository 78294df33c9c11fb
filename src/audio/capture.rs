//! Microphone capture feeding a shared sample ring

use super::sources::{SampleSource, SourceKind};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Microphone acquisition errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no input device found")]
    NoInputDevice,

    #[error("failed to get device config: {0}")]
    ConfigError(String),

    #[error("failed to build audio stream: {0}")]
    StreamError(String),

    #[error("failed to start stream: {0}")]
    PlayError(String),
}

/// Circular mono sample buffer shared with the stream callback
pub struct SampleRing {
    samples: Vec<f32>,
    write_pos: usize,
    written: usize,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            write_pos: 0,
            written: 0,
            capacity,
        }
    }

    pub fn push_samples(&mut self, data: &[f32]) {
        for &sample in data {
            self.samples[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.capacity;
        }
        self.written = (self.written + data.len()).min(self.capacity);
    }

    /// Total samples available, capped at capacity.
    pub fn available(&self) -> usize {
        self.written
    }

    /// Copy the most recent `out.len()` samples into `out`, oldest first.
    pub fn latest(&self, out: &mut [f32]) {
        let count = out.len().min(self.capacity);

        let start = if self.write_pos >= count {
            self.write_pos - count
        } else {
            self.capacity - (count - self.write_pos)
        };

        for (i, slot) in out.iter_mut().take(count).enumerate() {
            *slot = self.samples[(start + i) % self.capacity];
        }
    }
}

/// Live microphone input connected to the analyser.
///
/// Owns the cpal stream directly; the visualizer runs on one logical thread
/// so no dedicated capture thread is needed. The stream callback downmixes
/// interleaved frames to mono and pushes them into the shared ring.
pub struct MicrophoneSource {
    _stream: cpal::Stream,
    ring: Arc<Mutex<SampleRing>>,
    label: String,
    sample_rate: u32,
}

impl MicrophoneSource {
    /// Open the default input device and start capturing.
    pub fn open() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        let label = device.name().unwrap_or_else(|_| "microphone".to_string());
        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::ConfigError(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        log::info!(
            "Microphone capture: {} ({} Hz, {} channels)",
            label,
            sample_rate,
            channels
        );

        // Two seconds of headroom is plenty for a 4096-sample window.
        let ring = Arc::new(Mutex::new(SampleRing::new(sample_rate as usize * 2)));
        let ring_clone = ring.clone();

        let stream = match config.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), ring_clone, channels),
            SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), ring_clone, channels),
            SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), ring_clone, channels),
            other => {
                return Err(CaptureError::ConfigError(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|e| CaptureError::StreamError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::PlayError(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            ring,
            label,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl SampleSource for MicrophoneSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Microphone
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn fill_window(&mut self, out: &mut [f32]) -> bool {
        let ring = self.ring.lock();
        if ring.available() < out.len() {
            return false;
        }
        ring.latest(out);
        true
    }

    // Dropping the stream stops capture; nothing extra to release.
}

/// Build an input stream for the given sample type
fn build_stream<T: cpal::Sample + cpal::SizedSample>(
    device: &Device,
    config: &StreamConfig,
    ring: Arc<Mutex<SampleRing>>,
    channels: usize,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    f32: cpal::FromSample<T>,
{
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mono: Vec<f32> = data
                .chunks(channels)
                .map(|frame| {
                    let sum: f32 = frame
                        .iter()
                        .map(|s| -> f32 { cpal::Sample::from_sample(*s) })
                        .sum();
                    sum / channels as f32
                })
                .collect();

            ring.lock().push_samples(&mono);
        },
        |err| {
            log::error!("Audio stream error: {}", err);
        },
        None,
    )
}
