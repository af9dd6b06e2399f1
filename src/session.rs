//! One run of the animation
//!
//! Owns the particle store, the shared target set and the phase controller.
//! `tick` is the body of the render loop: fire due transitions, clear, then
//! update and draw each particle in store order.

use std::rc::Rc;
use std::time::Duration;

use crate::config::{Config, MotionConfig};
use crate::display::Surface;
use crate::error::Result;
use crate::math::Vec2;
use crate::motion::{self, MotionContext};
use crate::particles::ParticleStore;
use crate::phase::{AnimationPhase, PhaseController};
use crate::sampler::TargetPoint;
use crate::util::{Rgb, Rng};

pub struct Session {
    width: u32,
    height: u32,
    background: Rgb,
    palette: [Rgb; 3],
    motion: MotionConfig,
    store: ParticleStore,
    targets: Rc<[TargetPoint]>,
    phases: PhaseController,
    frames: u64,
}

impl Session {
    /// Build a session from sampled targets; particles start at the canvas center
    pub fn new(config: &Config, targets: Vec<TargetPoint>, rng: &mut Rng) -> Result<Self> {
        config.validate()?;
        let center = Vec2::new(config.width as f32 / 2.0, config.height as f32 / 2.0);
        let store = ParticleStore::spawn(center, &config.particles, rng);
        Self::with_store(config, targets, store)
    }

    /// Build a session around an existing particle store
    pub fn with_store(
        config: &Config,
        targets: Vec<TargetPoint>,
        store: ParticleStore,
    ) -> Result<Self> {
        if targets.is_empty() {
            log::warn!("logo produced no target points; particles will not converge");
        } else {
            log::info!(
                "{} target points for {} particles",
                targets.len(),
                store.len()
            );
        }

        Ok(Self {
            width: config.width,
            height: config.height,
            background: config.background_rgb()?,
            palette: config.palette_rgb()?,
            motion: config.motion,
            store,
            targets: targets.into(),
            phases: PhaseController::new(config.converge_at(), config.settle_at()),
            frames: 0,
        })
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phases.phase()
    }

    #[cfg(test)]
    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    /// Shared, read-only view of the sampled targets
    #[cfg(test)]
    pub fn targets(&self) -> Rc<[TargetPoint]> {
        Rc::clone(&self.targets)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fire the transitions due at `elapsed`, running assignment on entering Converging
    pub fn advance(&mut self, elapsed: Duration) -> Vec<AnimationPhase> {
        let entered = self.phases.poll(elapsed);
        for &phase in &entered {
            log::info!("{} phase at {} ms", phase, elapsed.as_millis());
            if phase == AnimationPhase::Converging {
                let bound = self.store.assign_targets(&self.targets);
                log::debug!("assigned targets to {} particles", bound);
            }
        }
        entered
    }

    /// One frame of the render loop
    pub fn tick(&mut self, surface: &mut impl Surface, elapsed: Duration) {
        self.advance(elapsed);

        surface.fill(self.background);

        let ctx = MotionContext::new(self.phase(), self.width, self.height, self.motion);
        for p in self.store.iter_mut() {
            motion::step(p, &ctx);
            surface.fill_circle(p.pos.x, p.pos.y, p.size(), p.swatch().resolve(&self.palette));
        }
        self.frames += 1;
    }
}

/// Run the loop on a simulated clock from 0 up to and including `until`
///
/// Used for headless snapshots. Returns the number of frames rendered.
pub fn run_simulated(
    session: &mut Session,
    surface: &mut impl Surface,
    until: Duration,
    frame: Duration,
) -> u64 {
    let mut elapsed = Duration::ZERO;
    let mut count = 0;
    loop {
        session.tick(surface, elapsed);
        count += 1;
        if frame.is_zero() {
            break;
        }
        elapsed += frame;
        if elapsed > until {
            break;
        }
    }
    count
}
