//! Radial frame composition

use super::{BarEnvelope, BeatState, ParticleField, VizConfig};
use serde::Serialize;
use std::f32::consts::PI;
use std::time::Duration;

/// One draw primitive for the host's renderer.
///
/// The core never rasterizes; it hands the presentation layer an ordered op
/// list per frame and leaves the drawing backend to the host.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Full clear, emitted only on teardown
    Clear,

    /// Translucent background fill over the previous frame (afterglow)
    TrailFill { r: u8, g: u8, b: u8, alpha: f32 },

    Particle {
        x: f32,
        y: f32,
        radius: f32,
        hue: f32,
        opacity: f32,
    },

    /// Radial bar segment from the ring outward
    BarSegment {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        /// Stronger glow while a kick is active
        glow: bool,
    },

    /// Rotating center disc
    CenterDisc { radius: f32, rotation: f32 },

    /// Musical glyph in the disc center, drawn only while running
    Glyph { hue: f32, size: f32 },
}

/// One frame of output
#[derive(Debug, Clone, Serialize, Default)]
pub struct Frame {
    pub ops: Vec<DrawOp>,
}

/// Maps smoothed pipeline state into the polar layout.
pub struct Compositor {
    config: VizConfig,
}

impl Compositor {
    pub fn new(config: VizConfig) -> Self {
        Self { config }
    }

    /// Ring radius for the current pulse (the ring inflates on the beat).
    pub fn ring_radius(&self, pulse: f32) -> f32 {
        self.config.base_radius + pulse * 1.5
    }

    /// Angle of a bar slot, slot 0 at the top, increasing clockwise.
    pub fn slot_angle(&self, slot: usize) -> f32 {
        2.0 * PI * slot as f32 / self.config.num_bars as f32 - PI / 2.0
    }

    /// Disc rotation for the given session uptime: a slow continuous spin
    /// decoupled from the audio.
    pub fn disc_rotation(elapsed: Duration) -> f32 {
        elapsed.as_secs_f32() / 3.0
    }

    /// Glyph hue for the given session uptime, cycling through the wheel.
    pub fn glyph_hue(elapsed: Duration) -> f32 {
        (elapsed.as_millis() as f32 / 20.0) % 360.0
    }

    /// Compose the full draw pass for one frame.
    pub fn compose(
        &self,
        beat: BeatState,
        bars: &BarEnvelope,
        particles: &ParticleField,
        elapsed: Duration,
        running: bool,
    ) -> Frame {
        let mut ops = Vec::with_capacity(2 + particles.len() + bars.len() + 2);

        ops.push(DrawOp::TrailFill {
            r: 5,
            g: 16,
            b: 30,
            alpha: self.config.trail_alpha,
        });

        for p in particles.iter() {
            ops.push(DrawOp::Particle {
                x: p.x,
                y: p.y,
                radius: p.radius,
                hue: p.hue,
                opacity: p.opacity,
            });
        }

        let center_x = self.config.width / 2.0;
        let center_y = self.config.height / 2.0;
        let radius = self.ring_radius(beat.pulse);

        for slot in 0..bars.len() {
            let angle = self.slot_angle(slot);
            let length = bars.bar_length(slot);
            let (sin, cos) = angle.sin_cos();

            ops.push(DrawOp::BarSegment {
                x1: center_x + radius * cos,
                y1: center_y + radius * sin,
                x2: center_x + (radius + length) * cos,
                y2: center_y + (radius + length) * sin,
                glow: beat.is_kick,
            });
        }

        ops.push(DrawOp::CenterDisc {
            radius: radius - 10.0,
            rotation: Self::disc_rotation(elapsed),
        });

        if running {
            ops.push(DrawOp::Glyph {
                hue: Self::glyph_hue(elapsed),
                size: 30.0 + beat.pulse,
            });
        }

        Frame { ops }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::{BarEnvelope, ParticleField};

    fn assert_approx(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    fn compositor() -> Compositor {
        Compositor::new(VizConfig::default())
    }

    fn beat(pulse: f32, is_kick: bool) -> BeatState {
        BeatState {
            average_bass: 0.0,
            is_kick,
            pulse,
        }
    }

    fn compose_default(running: bool) -> Frame {
        let config = VizConfig::default();
        let bars = BarEnvelope::new(&config);
        let particles = ParticleField::new(&config);
        compositor().compose(
            beat(0.0, false),
            &bars,
            &particles,
            Duration::from_secs(0),
            running,
        )
    }

    #[test]
    fn ring_inflates_with_the_pulse() {
        let comp = compositor();
        assert_eq!(comp.ring_radius(0.0), 120.0);
        assert_eq!(comp.ring_radius(10.0), 135.0);
    }

    #[test]
    fn slot_zero_points_straight_up() {
        let comp = compositor();
        assert_approx(comp.slot_angle(0), -PI / 2.0, 1e-6);
        // A quarter of the way around is due right (clockwise layout).
        assert_approx(comp.slot_angle(30), 0.0, 1e-5);
    }

    #[test]
    fn disc_spins_with_wall_clock_time() {
        assert_approx(Compositor::disc_rotation(Duration::from_secs(3)), 1.0, 1e-6);
        assert_approx(Compositor::disc_rotation(Duration::from_secs(9)), 3.0, 1e-6);
    }

    #[test]
    fn glyph_hue_cycles_through_the_wheel() {
        assert_approx(Compositor::glyph_hue(Duration::from_millis(1000)), 50.0, 1e-3);
        assert_approx(Compositor::glyph_hue(Duration::from_millis(7200)), 0.0, 1e-3);
    }

    #[test]
    fn frame_ops_are_layered_in_draw_order() {
        let frame = compose_default(true);

        assert!(matches!(frame.ops[0], DrawOp::TrailFill { .. }));
        assert!(matches!(frame.ops[1], DrawOp::Particle { .. }));
        assert!(matches!(frame.ops[51], DrawOp::BarSegment { .. }));
        assert!(matches!(frame.ops[170], DrawOp::BarSegment { .. }));
        assert!(matches!(frame.ops[171], DrawOp::CenterDisc { .. }));
        assert!(matches!(frame.ops[172], DrawOp::Glyph { .. }));
        assert_eq!(frame.ops.len(), 173);
    }

    #[test]
    fn glyph_is_omitted_when_not_running() {
        let frame = compose_default(false);
        assert!(!frame.ops.iter().any(|op| matches!(op, DrawOp::Glyph { .. })));
        assert_eq!(frame.ops.len(), 172);
    }

    #[test]
    fn top_bar_segment_extends_upward_from_the_ring() {
        let config = VizConfig::default();
        let mut bars = BarEnvelope::new(&config);
        bars.update(&vec![255u8; 4096]);
        let particles = ParticleField::new(&config);

        let frame = compositor().compose(
            beat(0.0, false),
            &bars,
            &particles,
            Duration::from_secs(0),
            true,
        );

        // First bar op sits after the trail fill and 50 particles.
        let DrawOp::BarSegment { x1, y1, x2, y2, .. } = frame.ops[51] else {
            panic!("expected a bar segment");
        };
        assert_approx(x1, 300.0, 1e-3);
        assert_approx(y1, 180.0, 1e-3); // 300 - 120
        assert_approx(x2, 300.0, 1e-3);
        assert_approx(y2, 80.0, 1e-3); // full 100-unit bar further up
    }

    #[test]
    fn ops_serialize_for_the_host() {
        let json = serde_json::to_string(&DrawOp::CenterDisc {
            radius: 110.0,
            rotation: 0.5,
        })
        .unwrap();
        assert!(json.contains("\"op\":\"center_disc\""));
    }
}
