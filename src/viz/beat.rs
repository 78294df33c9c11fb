//! Bass-energy kick detection and beat pulse

use super::VizConfig;

/// Beat state for one frame
#[derive(Debug, Clone, Copy)]
pub struct BeatState {
    /// Mean magnitude of the low-frequency band (0-255 scale)
    pub average_bass: f32,

    /// True when the bass average exceeded the kick threshold this frame
    pub is_kick: bool,

    /// Decaying pulse magnitude driving ring inflation and glyph size
    pub pulse: f32,
}

/// Derives a kick impulse and decaying pulse from low-frequency energy.
///
/// The pulse has a deliberately asymmetric envelope: it snaps to the peak
/// on a kick and decays geometrically every frame after, never going
/// negative.
pub struct BeatDetector {
    bass_bins: usize,
    kick_threshold: f32,
    pulse_peak: f32,
    pulse_decay: f32,
    pulse: f32,
}

impl BeatDetector {
    pub fn new(config: &VizConfig) -> Self {
        Self {
            bass_bins: config.bass_bins,
            kick_threshold: config.kick_threshold,
            pulse_peak: config.pulse_peak,
            pulse_decay: config.pulse_decay,
            pulse: 0.0,
        }
    }

    pub fn pulse(&self) -> f32 {
        self.pulse
    }

    pub fn reset(&mut self) {
        self.pulse = 0.0;
    }

    pub fn update(&mut self, snapshot: &[u8]) -> BeatState {
        let bins = self.bass_bins.min(snapshot.len());
        let average_bass = if bins == 0 {
            0.0
        } else {
            let sum: u32 = snapshot[..bins].iter().map(|&b| b as u32).sum();
            sum as f32 / bins as f32
        };

        // Strict inequality: exactly at threshold is not a kick.
        let is_kick = average_bass > self.kick_threshold;
        if is_kick {
            self.pulse = self.pulse_peak;
        } else if self.pulse > 0.0 {
            self.pulse *= self.pulse_decay;
        }
        self.pulse = self.pulse.max(0.0);

        BeatState {
            average_bass,
            is_kick,
            pulse: self.pulse,
        }
    }
}
