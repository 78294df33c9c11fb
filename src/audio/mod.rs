//! Audio source and spectral analysis module

mod analyser;
mod capture;
mod sources;

pub use analyser::SpectrumAnalyser;
pub use capture::{CaptureError, MicrophoneSource, SampleRing};
pub use sources::{FileSource, SampleSource, SourceError, SourceKind};

/// Spectral analysis configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Sample rate in Hz (discovered from the device for microphone input)
    pub sample_rate: u32,

    /// FFT window size
    pub fft_size: usize,

    /// Exponential smoothing factor applied to bin magnitudes between
    /// frames (0-1, higher retains more of the previous frame)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte value 0
    pub min_decibels: f32,

    /// Magnitude mapped to byte value 255
    pub max_decibels: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            fft_size: 4096,
            smoothing_time_constant: 0.85,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AudioConfig {
    /// Number of usable frequency bins (half the FFT size)
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }
}
