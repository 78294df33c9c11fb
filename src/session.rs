//! Visualizer session lifecycle and frame loop

use crate::audio::{
    AudioConfig, CaptureError, FileSource, MicrophoneSource, SampleSource, SourceError,
    SourceKind, SpectrumAnalyser,
};
use crate::viz::{AnalysisNode, Compositor, DrawOp, Frame, FramePipeline, SpectralSampler, VizConfig};
use std::time::Instant;
use thiserror::Error;

/// Session start errors, surfaced synchronously to the caller of start.
///
/// Teardown never produces one of these: stopping is best-effort and
/// idempotent by design.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("microphone unavailable: {0}")]
    Microphone(#[from] CaptureError),

    #[error("invalid audio file: {0}")]
    File(#[from] SourceError),
}

/// Host-provided display scheduler.
///
/// The core only assumes it can ask for one callback per display refresh
/// and cancel a pending one; the actual primitive is the host's business.
pub trait FrameScheduler {
    fn request_frame(&mut self);
    fn cancel_frame(&mut self);
}

impl AnalysisNode for SpectrumAnalyser {
    fn frequency_bin_count(&self) -> usize {
        SpectrumAnalyser::frequency_bin_count(self)
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        SpectrumAnalyser::byte_frequency_data(self, out)
    }
}

enum SessionState {
    Idle,
    Running { kind: SourceKind, title: String },
}

/// The aggregate visualizer: analyser singleton, per-frame pipeline state,
/// and the session state machine.
///
/// All mutable pipeline state is owned here and touched only from `tick`,
/// so the whole run loop stays on one logical thread. At most one source
/// feeds the analyser; starting a new one tears the old session down first.
pub struct Visualizer<S: FrameScheduler> {
    audio_config: AudioConfig,
    viz_config: VizConfig,
    scheduler: S,
    analyser: Option<SpectrumAnalyser>,
    sampler: SpectralSampler,
    pipeline: FramePipeline,
    compositor: Compositor,
    state: SessionState,
    epoch: Instant,
}

impl<S: FrameScheduler> Visualizer<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_config(AudioConfig::default(), VizConfig::default(), scheduler)
    }

    pub fn with_config(audio_config: AudioConfig, viz_config: VizConfig, scheduler: S) -> Self {
        Self {
            audio_config,
            compositor: Compositor::new(viz_config.clone()),
            pipeline: FramePipeline::new(&viz_config),
            viz_config,
            scheduler,
            analyser: None,
            sampler: SpectralSampler::new(),
            state: SessionState::Idle,
            epoch: Instant::now(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        match &self.state {
            SessionState::Running { kind, .. } => Some(*kind),
            SessionState::Idle => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.state {
            SessionState::Running { title, .. } => Some(title),
            SessionState::Idle => None,
        }
    }

    /// Start visualizing live microphone input.
    pub fn start_microphone(&mut self) -> Result<(), SessionError> {
        self.teardown();

        let mic = MicrophoneSource::open()?;
        let title = format!("Live input: {}", mic.label());
        self.begin(SourceKind::Microphone, title, Box::new(mic));
        Ok(())
    }

    /// Start visualizing a decoded, loop-enabled file buffer.
    pub fn start_file(
        &mut self,
        title: &str,
        samples: Vec<f32>,
        sample_rate: u32,
    ) -> Result<(), SessionError> {
        self.teardown();

        let source = FileSource::new(title.to_string(), samples, sample_rate)?;
        self.begin(SourceKind::File, title.to_string(), Box::new(source));
        Ok(())
    }

    fn begin(&mut self, kind: SourceKind, title: String, source: Box<dyn SampleSource>) {
        let analyser = self
            .analyser
            .get_or_insert_with(|| SpectrumAnalyser::new(self.audio_config.clone()));
        analyser.connect(source);

        self.pipeline = FramePipeline::new(&self.viz_config);
        self.epoch = Instant::now();
        self.state = SessionState::Running { kind, title };
        self.scheduler.request_frame();
        log::info!("Session started: {:?}", kind);
    }

    /// Tear down any active session without touching the state machine's
    /// outward API guarantees. Cancels the pending frame first so no draw
    /// overlaps the source switch.
    fn teardown(&mut self) {
        self.scheduler.cancel_frame();
        if let Some(analyser) = self.analyser.as_mut() {
            analyser.disconnect();
        }
        self.state = SessionState::Idle;
    }

    /// Stop the session and return the clear op for the host to apply.
    ///
    /// Idempotent: a second stop produces the same end state and the same
    /// frame without error.
    pub fn stop(&mut self) -> Frame {
        self.teardown();
        log::info!("Session stopped");
        Frame {
            ops: vec![DrawOp::Clear],
        }
    }

    /// Run one frame of the pipeline: sample, detect, smooth, move
    /// particles, compose, and request the next frame.
    ///
    /// Idle sessions (or a missing analyser) produce an empty frame and do
    /// not reschedule. A malformed snapshot skips the render but keeps the
    /// loop alive.
    pub fn tick(&mut self) -> Frame {
        if !self.is_running() {
            return Frame::default();
        }
        let Some(analyser) = self.analyser.as_mut() else {
            return Frame::default();
        };

        let snapshot = self.sampler.sample(analyser);
        let frame = if self.pipeline.bars().stride_for(snapshot.len()) == 0 {
            log::warn!(
                "Skipping frame: snapshot of {} bins is too short for {} bars",
                snapshot.len(),
                self.pipeline.bars().len()
            );
            Frame::default()
        } else {
            let beat = self.pipeline.advance(snapshot);
            self.compositor.compose(
                beat,
                self.pipeline.bars(),
                self.pipeline.particles(),
                self.epoch.elapsed(),
                true,
            )
        };

        self.scheduler.request_frame();
        frame
    }
}
