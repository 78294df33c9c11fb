//! Per-bar decaying magnitude envelope

use super::VizConfig;

/// Fixed ring of smoothed bar magnitudes, one per angular slot.
///
/// Each slot follows its raw sample with instant attack and slow geometric
/// release, which gives bars that pop up on transients and trail back down.
/// The slot count never changes for the lifetime of a session and every
/// value stays in [0, 255].
pub struct BarEnvelope {
    values: Vec<f32>,
    decay: f32,
    scale: f32,
}

impl BarEnvelope {
    pub fn new(config: &VizConfig) -> Self {
        Self {
            values: vec![0.0; config.num_bars],
            decay: config.bar_decay,
            scale: config.bar_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, slot: usize) -> f32 {
        self.values[slot]
    }

    /// Bar length in logical units for a slot (normalized magnitude times
    /// the configured scale).
    pub fn bar_length(&self, slot: usize) -> f32 {
        self.values[slot] / 255.0 * self.scale
    }

    /// Sampling stride into a snapshot of the given length. Only the lower
    /// third of the spectrum is ever visualized, favoring bass and mids.
    pub fn stride_for(&self, snapshot_len: usize) -> usize {
        snapshot_len / self.values.len() / 3
    }

    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }

    /// Update every slot from the snapshot. A snapshot too short to give a
    /// positive stride leaves the envelope untouched.
    pub fn update(&mut self, snapshot: &[u8]) {
        let stride = self.stride_for(snapshot.len());
        if stride == 0 {
            return;
        }

        for (i, value) in self.values.iter_mut().enumerate() {
            let raw = snapshot[i * stride] as f32;
            if raw > *value {
                *value = raw;
            } else {
                *value = (*value * self.decay).max(0.0);
            }
        }
    }
}
