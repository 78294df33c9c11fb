//! Ambient beat-reactive particle field

use super::VizConfig;
use rand::RngExt;

/// One recycled particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed: f32,
    pub opacity: f32,
    pub hue: f32,
}

/// Fixed set of upward-drifting particles, recycled toroidally.
///
/// Particles are created once and never destroyed; crossing the top edge
/// wraps them to the bottom at a fresh random x. The only audio coupling is
/// the instantaneous kick flag, which triples the drift speed for a frame.
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
}

impl ParticleField {
    pub fn new(config: &VizConfig) -> Self {
        let mut rng = rand::rng();
        let particles = (0..config.particle_count)
            .map(|_| Particle {
                x: rng.random_range(0.0..config.width),
                y: rng.random_range(0.0..config.height),
                radius: rng.random_range(1.0..3.0),
                speed: rng.random_range(0.5..2.5),
                opacity: rng.random::<f32>(),
                hue: rng.random_range(0.0..360.0),
            })
            .collect();

        Self {
            particles,
            width: config.width,
            height: config.height,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn update(&mut self, is_kick: bool) {
        let mut rng = rand::rng();
        let boost = if is_kick { 3.0 } else { 1.0 };

        for p in &mut self.particles {
            p.y -= p.speed * boost;
            if p.y < 0.0 {
                p.y = self.height;
                p.x = rng.random_range(0.0..self.width);
            }
        }
    }

    #[cfg(test)]
    fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }
}
