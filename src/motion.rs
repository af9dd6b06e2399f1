//! Per-frame particle motion
//!
//! `step` is a pure function of the particle and an injected context; the phase
//! is read from the context, never from global state. Rates are per frame, not
//! per second, so the animation speed follows the display refresh rate.

use crate::config::MotionConfig;
use crate::particles::Particle;
use crate::phase::AnimationPhase;

/// Everything a motion step needs besides the particle itself
#[derive(Debug, Clone, Copy)]
pub struct MotionContext {
    pub phase: AnimationPhase,
    pub width: f32,
    pub height: f32,
    pub params: MotionConfig,
}

impl MotionContext {
    pub fn new(phase: AnimationPhase, width: u32, height: u32, params: MotionConfig) -> Self {
        Self {
            phase,
            width: width as f32,
            height: height as f32,
            params,
        }
    }
}

/// Advance one particle by one frame
pub fn step(p: &mut Particle, ctx: &MotionContext) {
    match ctx.phase {
        AnimationPhase::Expanding => expand(p, ctx),
        AnimationPhase::Converging => approach(p, ctx.params.converge_rate),
        AnimationPhase::Settled => approach(p, ctx.params.settle_rate),
    }
}

fn expand(p: &mut Particle, ctx: &MotionContext) {
    p.pos += p.vel;

    // Checked on the moved position; the particle is not pushed back inside,
    // so it can render past the edge for a frame.
    if p.pos.x < 0.0 || p.pos.x > ctx.width {
        p.vel.x *= -ctx.params.restitution;
    }
    if p.pos.y < 0.0 || p.pos.y > ctx.height {
        p.vel.y *= -ctx.params.restitution;
    }

    p.vel *= ctx.params.friction;
}

fn approach(p: &mut Particle, rate: f32) {
    if let Some(target) = p.target() {
        p.pos = p.pos.approach(target.into(), rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::particles::Swatch;
    use crate::sampler::TargetPoint;

    fn ctx(phase: AnimationPhase) -> MotionContext {
        MotionContext::new(phase, 100, 200, MotionConfig::default())
    }

    fn particle(pos: (f32, f32), vel: (f32, f32)) -> Particle {
        Particle::new(
            Vec2::new(pos.0, pos.1),
            Vec2::new(vel.0, vel.1),
            3.0,
            Swatch::Secondary,
        )
    }

    #[test]
    fn test_bounce_at_origin() {
        let mut p = particle((0.0, 0.0), (-3.0, -2.0));
        step(&mut p, &ctx(AnimationPhase::Expanding));

        assert!(p.pos.approx_eq(&Vec2::new(-3.0, -2.0), 1e-6));
        assert!((p.vel.x - 2.376).abs() < 1e-5, "vx = {}", p.vel.x);
        assert!((p.vel.y - 1.584).abs() < 1e-5, "vy = {}", p.vel.y);
    }

    #[test]
    fn test_bounce_axes_are_independent() {
        // Crosses the right wall only
        let mut p = particle((99.0, 50.0), (4.0, 1.0));
        step(&mut p, &ctx(AnimationPhase::Expanding));
        assert!((p.vel.x - (-4.0 * 0.8 * 0.99)).abs() < 1e-5);
        assert!((p.vel.y - 0.99).abs() < 1e-6);

        // Crosses the bottom wall only
        let mut p = particle((50.0, 199.0), (1.0, 3.0));
        step(&mut p, &ctx(AnimationPhase::Expanding));
        assert!((p.vel.x - 0.99).abs() < 1e-6);
        assert!((p.vel.y - (-3.0 * 0.8 * 0.99)).abs() < 1e-5);
    }

    #[test]
    fn test_no_clamp_after_bounce() {
        let mut p = particle((1.0, 10.0), (-5.0, 0.0));
        step(&mut p, &ctx(AnimationPhase::Expanding));
        assert!(p.pos.x < 0.0);
    }

    #[test]
    fn test_edge_exactly_on_boundary_does_not_bounce() {
        let mut p = particle((95.0, 10.0), (5.0, 0.0));
        step(&mut p, &ctx(AnimationPhase::Expanding));
        assert_eq!(p.pos.x, 100.0);
        assert!(p.vel.x > 0.0);
    }

    #[test]
    fn test_friction_never_increases_speed_inside() {
        let mut p = particle((50.0, 100.0), (1.5, -0.7));
        let c = ctx(AnimationPhase::Expanding);
        for _ in 0..200 {
            let before = p.vel;
            step(&mut p, &c);
            let inside = p.pos.x >= 0.0 && p.pos.x <= 100.0 && p.pos.y >= 0.0 && p.pos.y <= 200.0;
            if inside {
                assert!(p.vel.x.abs() <= before.x.abs());
                assert!(p.vel.y.abs() <= before.y.abs());
                assert_eq!(p.vel.x.signum(), before.x.signum());
                assert_eq!(p.vel.y.signum(), before.y.signum());
            }
        }
    }

    #[test]
    fn test_expanding_ignores_target() {
        let mut p = particle((10.0, 10.0), (1.0, 1.0));
        p.assign(TargetPoint::new(90.0, 90.0));
        step(&mut p, &ctx(AnimationPhase::Expanding));
        assert!(p.pos.approx_eq(&Vec2::new(11.0, 11.0), 1e-6));
    }

    #[test]
    fn test_converging_is_convex_step() {
        let mut p = particle((0.0, 0.0), (7.0, 7.0));
        p.assign(TargetPoint::new(100.0, -40.0));
        step(&mut p, &ctx(AnimationPhase::Converging));
        assert!(p.pos.approx_eq(&Vec2::new(5.0, -2.0), 1e-5));
        // velocity is untouched outside the expanding phase
        assert_eq!(p.vel, Vec2::new(7.0, 7.0));
    }

    #[test]
    fn test_settled_uses_faster_rate() {
        let mut p = particle((0.0, 0.0), (0.0, 0.0));
        p.assign(TargetPoint::new(50.0, 10.0));
        step(&mut p, &ctx(AnimationPhase::Settled));
        assert!(p.pos.approx_eq(&Vec2::new(10.0, 2.0), 1e-5));
    }

    #[test]
    fn test_distance_non_increasing_and_converges() {
        for phase in [AnimationPhase::Converging, AnimationPhase::Settled] {
            let mut p = particle((-30.0, 250.0), (0.0, 0.0));
            let target = TargetPoint::new(40.0, 60.0);
            p.assign(target);
            let goal: Vec2 = target.into();
            let c = ctx(phase);
            let mut last = p.pos.distance(goal);
            for _ in 0..500 {
                step(&mut p, &c);
                let d = p.pos.distance(goal);
                assert!(d <= last);
                last = d;
            }
            assert!(last < 0.01, "{} still {} away", phase, last);
        }
    }

    #[test]
    fn test_untargeted_particle_stays_put() {
        for phase in [AnimationPhase::Converging, AnimationPhase::Settled] {
            let mut p = particle((12.0, 34.0), (5.0, 5.0));
            step(&mut p, &ctx(phase));
            assert_eq!(p.pos, Vec2::new(12.0, 34.0));
        }
    }

    #[test]
    fn test_step_keeps_identity_fields() {
        let mut p = particle((0.0, 0.0), (-3.0, 9.0));
        p.assign(TargetPoint::new(1.0, 2.0));
        for phase in [
            AnimationPhase::Expanding,
            AnimationPhase::Converging,
            AnimationPhase::Settled,
        ] {
            step(&mut p, &ctx(phase));
            assert_eq!(p.size(), 3.0);
            assert_eq!(p.swatch(), Swatch::Secondary);
            assert_eq!(p.target(), Some(TargetPoint::new(1.0, 2.0)));
        }
    }
}
