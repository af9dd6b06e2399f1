//! Particle store
//!
//! A fixed set of particles created at the canvas center. The set never grows
//! or shrinks; the motion engine mutates positions and velocities in place.

use crate::config::ParticleConfig;
use crate::math::Vec2;
use crate::sampler::TargetPoint;
use crate::util::{Rgb, Rng};

/// Which of the three palette entries a particle is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Primary,
    Secondary,
    Tertiary,
}

impl Swatch {
    pub const ALL: [Swatch; 3] = [Swatch::Primary, Swatch::Secondary, Swatch::Tertiary];

    #[inline]
    pub fn resolve(self, palette: &[Rgb; 3]) -> Rgb {
        palette[self as usize]
    }
}

/// A single particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    size: f32,
    swatch: Swatch,
    target: Option<TargetPoint>,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, size: f32, swatch: Swatch) -> Self {
        Self {
            pos,
            vel,
            size,
            swatch,
            target: None,
        }
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn swatch(&self) -> Swatch {
        self.swatch
    }

    #[inline]
    pub fn target(&self) -> Option<TargetPoint> {
        self.target
    }

    #[inline]
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Bind to a target; a particle that already has one keeps it
    ///
    /// Returns whether the binding took place.
    pub fn assign(&mut self, target: TargetPoint) -> bool {
        if self.has_target() {
            return false;
        }
        self.target = Some(target);
        true
    }
}

/// Round-robin target policy: particle `i` gets `targets[i mod len]`
///
/// With more particles than targets, several particles share a point and the
/// logo shows visible clusters. That clustering is part of the look.
#[inline]
pub fn target_for(index: usize, targets: &[TargetPoint]) -> Option<TargetPoint> {
    if targets.is_empty() {
        None
    } else {
        Some(targets[index % targets.len()])
    }
}

/// Fixed-size particle collection in stable order
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// Spawn `config.count` particles at `center` with random swatch, size and velocity
    pub fn spawn(center: Vec2, config: &ParticleConfig, rng: &mut Rng) -> Self {
        let particles = (0..config.count)
            .map(|_| {
                let swatch = Swatch::ALL[rng.index(Swatch::ALL.len())];
                let size = if config.size_max > config.size_min {
                    rng.range_f32(config.size_min, config.size_max)
                } else {
                    config.size_min
                };
                let vel = Vec2::new(
                    rng.range_f32(-config.speed, config.speed),
                    rng.range_f32(-config.speed, config.speed),
                );
                Particle::new(center, vel, size, swatch)
            })
            .collect();
        Self { particles }
    }

    /// Wrap an explicit particle list (deterministic setups)
    #[cfg(test)]
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Bind every particle to `target_for(i)`
    ///
    /// Returns the number of particles bound; zero for an empty target set.
    pub fn assign_targets(&mut self, targets: &[TargetPoint]) -> usize {
        let mut bound = 0;
        for (i, p) in self.particles.iter_mut().enumerate() {
            if let Some(target) = target_for(i, targets) {
                if p.assign(target) {
                    bound += 1;
                }
            }
        }
        bound
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }
}
