//! Audio source kinds and the sample-source contract

use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Kind of audio source feeding the analyser
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Live microphone input
    Microphone,

    /// Decoded, loop-enabled file buffer
    File,
}

/// Audio source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("decoded file buffer is empty")]
    EmptyBuffer,

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// A stream of mono samples the analyser can pull a window from.
///
/// Exactly one source is connected to the analyser at a time. `stop` is
/// best-effort and must be safe to call more than once.
pub trait SampleSource {
    fn kind(&self) -> SourceKind;

    fn label(&self) -> &str;

    /// Fill `out` with the most recent `out.len()` mono samples.
    /// Returns false when not enough data has arrived yet.
    fn fill_window(&mut self, out: &mut [f32]) -> bool;

    /// Release the underlying resource. Idempotent.
    fn stop(&mut self) {}
}

/// Looping playback over a decoded mono buffer.
///
/// The playhead advances against wall-clock time so the analyser sees the
/// buffer as a live stream, wrapping back to the start when it runs out.
pub struct FileSource {
    samples: Vec<f32>,
    sample_rate: u32,
    label: String,
    started: Instant,
    stopped: bool,
}

impl FileSource {
    pub fn new(label: String, samples: Vec<f32>, sample_rate: u32) -> Result<Self, SourceError> {
        if samples.is_empty() {
            return Err(SourceError::EmptyBuffer);
        }
        if sample_rate == 0 {
            return Err(SourceError::InvalidSampleRate(sample_rate));
        }

        Ok(Self {
            samples,
            sample_rate,
            label,
            started: Instant::now(),
            stopped: false,
        })
    }

    /// Current playhead position in samples, wrapped to the buffer length.
    fn playhead(&self) -> usize {
        let elapsed = self.started.elapsed().as_secs_f64();
        let pos = (elapsed * self.sample_rate as f64) as usize;
        pos % self.samples.len()
    }
}

impl SampleSource for FileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn fill_window(&mut self, out: &mut [f32]) -> bool {
        if self.stopped {
            return false;
        }

        // Window ends at the playhead; earlier samples wrap around the loop.
        let len = self.samples.len();
        let end = self.playhead();
        let out_len = out.len();
        for (i, slot) in out.iter_mut().enumerate() {
            let back = out_len - i;
            let idx = (end + len - (back % len)) % len;
            *slot = self.samples[idx];
        }
        true
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_rejected() {
        let result = FileSource::new("empty".into(), Vec::new(), 48000);
        assert!(matches!(result, Err(SourceError::EmptyBuffer)));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let result = FileSource::new("bad".into(), vec![0.0; 16], 0);
        assert!(matches!(result, Err(SourceError::InvalidSampleRate(0))));
    }

    #[test]
    fn file_source_reports_kind_and_label() {
        let source = FileSource::new("track".into(), vec![0.5; 64], 48000).unwrap();
        assert_eq!(source.kind(), SourceKind::File);
        assert_eq!(source.label(), "track");
    }

    #[test]
    fn fill_window_wraps_around_the_loop() {
        let samples: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let mut source = FileSource::new("loop".into(), samples, 48000).unwrap();

        // A window longer than the buffer must still fill completely.
        let mut out = vec![-1.0; 20];
        assert!(source.fill_window(&mut out));
        assert!(out.iter().all(|&s| (0.0..8.0).contains(&s)));
    }

    #[test]
    fn stopped_source_yields_no_data() {
        let mut source = FileSource::new("t".into(), vec![0.1; 32], 48000).unwrap();
        source.stop();
        source.stop(); // idempotent

        let mut out = vec![0.0; 8];
        assert!(!source.fill_window(&mut out));
    }
}
