//! Audio-to-visual mapping pipeline

mod bars;
mod beat;
mod compositor;
mod particles;
mod sampler;

pub use bars::BarEnvelope;
pub use beat::{BeatDetector, BeatState};
pub use compositor::{Compositor, DrawOp, Frame};
pub use particles::{Particle, ParticleField};
pub use sampler::{AnalysisNode, SpectralSampler};

/// Visual pipeline configuration
#[derive(Debug, Clone)]
pub struct VizConfig {
    /// Number of angular bar slots around the ring
    pub num_bars: usize,

    /// Ring radius at rest, in logical units
    pub base_radius: f32,

    /// Low-frequency bins averaged for kick detection
    pub bass_bins: usize,

    /// Average bass magnitude (0-255) that must be exceeded for a kick
    pub kick_threshold: f32,

    /// Pulse value set on a kick
    pub pulse_peak: f32,

    /// Pulse retained per frame without a kick (geometric decay)
    pub pulse_decay: f32,

    /// Bar envelope retained per frame when the raw sample is lower
    pub bar_decay: f32,

    /// Bar length at full (255) magnitude, in logical units
    pub bar_scale: f32,

    /// Ambient particles kept alive for the session
    pub particle_count: usize,

    /// Canvas width in logical units
    pub width: f32,

    /// Canvas height in logical units
    pub height: f32,

    /// Alpha of the per-frame background fill (motion-trail afterglow)
    pub trail_alpha: f32,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            num_bars: 120,
            base_radius: 120.0,
            bass_bins: 20,
            kick_threshold: 180.0,
            pulse_peak: 10.0,
            pulse_decay: 0.9,
            bar_decay: 0.92,
            bar_scale: 100.0,
            particle_count: 50,
            width: 600.0,
            height: 600.0,
            trail_alpha: 0.3,
        }
    }
}

/// Per-frame mutable pipeline state: beat detector, bar envelope, particles.
///
/// One instance lives for the session; `advance` runs the stages in their
/// fixed order (detector, bars, particles) against one snapshot.
pub struct FramePipeline {
    beat: BeatDetector,
    bars: BarEnvelope,
    particles: ParticleField,
}

impl FramePipeline {
    pub fn new(config: &VizConfig) -> Self {
        Self {
            beat: BeatDetector::new(config),
            bars: BarEnvelope::new(config),
            particles: ParticleField::new(config),
        }
    }

    /// Advance every stage one frame with the given snapshot.
    pub fn advance(&mut self, snapshot: &[u8]) -> BeatState {
        let beat = self.beat.update(snapshot);
        self.bars.update(snapshot);
        self.particles.update(beat.is_kick);
        beat
    }

    pub fn bars(&self) -> &BarEnvelope {
        &self.bars
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn beat(&self) -> &BeatDetector {
        &self.beat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = VizConfig::default();

        assert_eq!(config.num_bars, 120);
        assert_eq!(config.base_radius, 120.0);
        assert_eq!(config.bass_bins, 20);
        assert_eq!(config.kick_threshold, 180.0);
        assert_eq!(config.pulse_peak, 10.0);
        assert_eq!(config.pulse_decay, 0.9);
        assert_eq!(config.bar_decay, 0.92);
        assert_eq!(config.bar_scale, 100.0);
        assert_eq!(config.particle_count, 50);
        assert_eq!(config.width, 600.0);
        assert_eq!(config.height, 600.0);
    }

    #[test]
    fn pipeline_runs_all_stages_on_one_snapshot() {
        let config = VizConfig::default();
        let mut pipeline = FramePipeline::new(&config);

        // Loud bass across the whole snapshot.
        let snapshot = vec![200u8; 4096];
        let beat = pipeline.advance(&snapshot);

        assert!(beat.is_kick);
        assert_eq!(beat.pulse, 10.0);
        assert_eq!(pipeline.bars().value(0), 200.0);
        assert_eq!(pipeline.particles().len(), 50);
    }
}
