//! Spectral analyser producing byte-magnitude frequency snapshots

use super::sources::SampleSource;
use super::AudioConfig;
use rustfft::{num_complex::Complex, FftPlanner};

/// FFT-based frequency analyser.
///
/// Pulls a window of mono samples from the connected source, applies a Hann
/// window and a forward FFT, smooths bin magnitudes against the previous
/// frame, and maps them onto unsigned 0-255 magnitudes through the
/// configured decibel range. Smoothing state persists across source
/// switches; the analyser itself is created once per visualizer lifetime.
pub struct SpectrumAnalyser {
    config: AudioConfig,
    planner: FftPlanner<f32>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    sample_window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    source: Option<Box<dyn SampleSource>>,
}

impl SpectrumAnalyser {
    pub fn new(config: AudioConfig) -> Self {
        let fft_size = config.fft_size;

        // Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (fft_size - 1) as f32).cos())
            })
            .collect();

        let bin_count = config.frequency_bin_count();

        Self {
            config,
            planner: FftPlanner::new(),
            window,
            smoothed: vec![0.0; bin_count],
            sample_window: vec![0.0; fft_size],
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            source: None,
        }
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.config.frequency_bin_count()
    }

    /// Attach a source, replacing (and stopping) any previous one.
    pub fn connect(&mut self, source: Box<dyn SampleSource>) {
        self.disconnect();
        log::info!("Analyser source connected: {}", source.label());
        self.source = Some(source);
    }

    /// Detach and stop the current source. Idempotent, never fails.
    pub fn disconnect(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
            log::info!("Analyser source disconnected: {}", source.label());
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn source_kind(&self) -> Option<super::SourceKind> {
        self.source.as_ref().map(|s| s.kind())
    }

    /// Compute the current byte-magnitude spectrum into `out`.
    ///
    /// `out` must be sized to `frequency_bin_count()`. A source that cannot
    /// yet fill a full window is treated as silence, so the smoothed
    /// spectrum decays instead of jumping.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        let have_window = match self.source.as_mut() {
            Some(source) => source.fill_window(&mut self.sample_window),
            None => false,
        };
        if !have_window {
            self.sample_window.fill(0.0);
        }

        let fft_size = self.config.fft_size;
        for i in 0..fft_size {
            self.scratch[i] = Complex::new(self.sample_window[i] * self.window[i], 0.0);
        }

        let fft = self.planner.plan_fft_forward(fft_size);
        fft.process(&mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let min_db = self.config.min_decibels;
        let max_db = self.config.max_decibels;
        let db_span = max_db - min_db;

        for (k, slot) in out.iter_mut().enumerate().take(self.smoothed.len()) {
            let magnitude = self.scratch[k].norm() / fft_size as f32;
            self.smoothed[k] = tau * self.smoothed[k] + (1.0 - tau) * magnitude;

            let db = 20.0 * self.smoothed[k].max(f32::MIN_POSITIVE).log10();
            let scaled = 255.0 * (db - min_db) / db_span;
            *slot = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SourceKind, SampleSource};

    struct ToneSource {
        freq: f32,
        sample_rate: f32,
        phase: usize,
    }

    impl SampleSource for ToneSource {
        fn kind(&self) -> SourceKind {
            SourceKind::File
        }

        fn label(&self) -> &str {
            "tone"
        }

        fn fill_window(&mut self, out: &mut [f32]) -> bool {
            for (i, slot) in out.iter_mut().enumerate() {
                let t = (self.phase + i) as f32 / self.sample_rate;
                *slot = (2.0 * std::f32::consts::PI * self.freq * t).sin();
            }
            self.phase += out.len();
            true
        }
    }

    fn analyser() -> SpectrumAnalyser {
        SpectrumAnalyser::new(AudioConfig::default())
    }

    #[test]
    fn silence_maps_to_zero_bytes() {
        let mut ana = analyser();
        let mut out = vec![0u8; ana.frequency_bin_count()];

        ana.byte_frequency_data(&mut out);

        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn no_source_behaves_like_silence() {
        let mut ana = analyser();
        assert!(!ana.has_source());

        let mut out = vec![255u8; ana.frequency_bin_count()];
        ana.byte_frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn tone_concentrates_energy_near_its_bin() {
        let config = AudioConfig::default();
        let sample_rate = config.sample_rate as f32;
        let fft_size = config.fft_size;
        let freq = 1000.0;

        let mut ana = SpectrumAnalyser::new(config);
        ana.connect(Box::new(ToneSource {
            freq,
            sample_rate,
            phase: 0,
        }));

        // Run several frames so smoothing converges toward the tone.
        let mut out = vec![0u8; ana.frequency_bin_count()];
        for _ in 0..30 {
            ana.byte_frequency_data(&mut out);
        }

        let expected_bin = (freq * fft_size as f32 / sample_rate).round() as usize;
        let peak_bin = out
            .iter()
            .enumerate()
            .max_by_key(|&(_, &v)| v)
            .map(|(i, _)| i)
            .unwrap();

        assert!(
            peak_bin.abs_diff(expected_bin) <= 2,
            "peak at bin {peak_bin}, expected near {expected_bin}"
        );
        assert!(out[peak_bin] > 0);
    }

    #[test]
    fn connect_replaces_and_stops_previous_source() {
        let mut ana = analyser();

        ana.connect(Box::new(ToneSource {
            freq: 440.0,
            sample_rate: 48000.0,
            phase: 0,
        }));
        assert_eq!(ana.source_kind(), Some(SourceKind::File));

        ana.connect(Box::new(ToneSource {
            freq: 880.0,
            sample_rate: 48000.0,
            phase: 0,
        }));
        assert!(ana.has_source());

        ana.disconnect();
        ana.disconnect(); // idempotent
        assert!(!ana.has_source());
    }
}
