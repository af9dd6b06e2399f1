//! Animation phase state machine
//!
//! Expanding -> Converging -> Settled, driven purely by two one-shot timers
//! armed at session start. The phase never moves backwards.

use std::fmt;
use std::time::Duration;

use crate::timer::Timers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnimationPhase {
    /// Particles fly outward from the center and bounce off the walls
    Expanding,
    /// Particles ease toward their targets
    Converging,
    /// Same as converging, with a faster approach
    Settled,
}

impl fmt::Display for AnimationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnimationPhase::Expanding => "expanding",
            AnimationPhase::Converging => "converging",
            AnimationPhase::Settled => "settled",
        };
        f.write_str(name)
    }
}

pub struct PhaseController {
    phase: AnimationPhase,
    timers: Timers<AnimationPhase>,
}

impl PhaseController {
    /// Start in `Expanding` with both transitions scheduled
    pub fn new(converge_at: Duration, settle_at: Duration) -> Self {
        let mut timers = Timers::new();
        timers.schedule(converge_at, AnimationPhase::Converging);
        timers.schedule(settle_at, AnimationPhase::Settled);
        Self {
            phase: AnimationPhase::Expanding,
            timers,
        }
    }

    #[inline]
    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Fire every transition due at `elapsed`; returns the phases entered, in order
    ///
    /// A frame that arrives late enough to cover both deadlines enters both
    /// phases, so callers still see the Converging entry.
    pub fn poll(&mut self, elapsed: Duration) -> Vec<AnimationPhase> {
        let mut entered = Vec::new();
        for next in self.timers.drain_due(elapsed) {
            if next > self.phase {
                self.phase = next;
                entered.push(next);
            }
        }
        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_phase_sequence() {
        let mut pc = PhaseController::new(ms(3000), ms(6000));
        assert_eq!(pc.phase(), AnimationPhase::Expanding);

        assert!(pc.poll(ms(100)).is_empty());
        assert_eq!(pc.poll(ms(3000)), vec![AnimationPhase::Converging]);
        assert_eq!(pc.phase(), AnimationPhase::Converging);

        assert!(pc.poll(ms(4000)).is_empty());
        assert_eq!(pc.poll(ms(6016)), vec![AnimationPhase::Settled]);
        assert_eq!(pc.phase(), AnimationPhase::Settled);
    }

    #[test]
    fn test_transitions_fire_once() {
        let mut pc = PhaseController::new(ms(3000), ms(6000));
        pc.poll(ms(6000));
        for t in 6000..6100 {
            assert!(pc.poll(ms(t)).is_empty());
        }
        assert_eq!(pc.phase(), AnimationPhase::Settled);
    }

    #[test]
    fn test_late_frame_enters_both_phases_in_order() {
        let mut pc = PhaseController::new(ms(3000), ms(6000));
        assert_eq!(
            pc.poll(ms(9000)),
            vec![AnimationPhase::Converging, AnimationPhase::Settled]
        );
    }

    #[test]
    fn test_never_regresses() {
        // Settle scheduled before converge: converge would move backwards and is dropped
        let mut pc = PhaseController::new(ms(5000), ms(1000));
        assert_eq!(pc.poll(ms(1000)), vec![AnimationPhase::Settled]);
        assert!(pc.poll(ms(5000)).is_empty());
        assert_eq!(pc.phase(), AnimationPhase::Settled);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(AnimationPhase::Converging.to_string(), "converging");
    }
}
