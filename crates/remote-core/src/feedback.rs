//! Visual feedback on the lights themselves
//!
//! When the remote overrides the automation zone, the user gets no other
//! confirmation than the lamps. Dimmable lamps dip three times, switch-only
//! lamps blink. Lamps that are off or unreachable are left alone.
//!
//! The routine sleeps between steps and so blocks its caller for up to about
//! a second. It only runs on the remote's own worker thread.

use crate::targets::{best_effort, LightControl};
use crate::types::LightTarget;
use std::time::Duration;

/// Number of dim dips per dimmable lamp
const DIP_PULSES: usize = 3;

/// Dip depth as a fraction of the current level
const DIP_FACTOR: f64 = 0.6;

/// Switch states for the blink sequence
const BLINK_EDGES: [bool; 4] = [false, true, false, true];

/// Step pacing for the feedback sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Delay between dim-dip steps
    pub dim_step: Duration,
    /// Delay between blink edges
    pub blink_step: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            dim_step: Duration::from_millis(150),
            blink_step: Duration::from_millis(120),
        }
    }
}

impl Pacing {
    /// No delays (tests, batch replays)
    pub fn immediate() -> Self {
        Self {
            dim_step: Duration::ZERO,
            blink_step: Duration::ZERO,
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

/// Dipped level for a lamp currently at `level` (never below 1)
pub fn dip_level(level: u8) -> u8 {
    ((f64::from(level) * DIP_FACTOR).round() as u8).max(1)
}

/// Flash every target so the user sees the command was accepted
pub fn visual_feedback(lights: &dyn LightControl, targets: &[LightTarget], pacing: Pacing) {
    for target in targets {
        if let Some(dimmer) = target.dimmer {
            let Some(level) = best_effort("feedback read dimmer", lights.dim_level(dimmer)) else {
                continue;
            };
            if level == 0 {
                continue;
            }
            let dipped = dip_level(level);
            let steps = [dipped, level].repeat(DIP_PULSES);
            for (i, step) in steps.iter().enumerate() {
                if i > 0 {
                    pause(pacing.dim_step);
                }
                best_effort("feedback dip", lights.set_dim_level(dimmer, *step));
            }
        } else if let Some(switch) = target.switch {
            let is_on = best_effort("feedback read switch", lights.switch_state(switch));
            if is_on != Some(true) {
                continue;
            }
            for (i, edge) in BLINK_EDGES.iter().enumerate() {
                if i > 0 {
                    pause(pacing.blink_step);
                }
                best_effort("feedback blink", lights.set_switch_state(switch, *edge));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryLights, VariableValue, Write};
    use crate::types::VariableRef;

    #[test]
    fn test_dip_level() {
        assert_eq!(dip_level(100), 60);
        assert_eq!(dip_level(55), 33);
        assert_eq!(dip_level(1), 1);
        assert_eq!(dip_level(2), 1);
    }

    #[test]
    fn test_dimmer_dips_three_times() {
        let lights = MemoryLights::new();
        lights.insert_dimmer(VariableRef(5), 80);

        visual_feedback(&lights, &[LightTarget::full(0, 5, 0)], Pacing::immediate());

        let levels: Vec<_> = lights
            .writes()
            .into_iter()
            .map(|w| w.value)
            .collect();
        assert_eq!(
            levels,
            [VariableValue::Dimmer(48), VariableValue::Dimmer(80)].repeat(3)
        );
        assert_eq!(lights.dimmer(VariableRef(5)), Some(80));
    }

    #[test]
    fn test_switch_only_blinks_when_on() {
        let lights = MemoryLights::new();
        lights.insert_switch(VariableRef(1), true);
        lights.insert_switch(VariableRef(2), false);

        visual_feedback(
            &lights,
            &[LightTarget::switch(1), LightTarget::switch(2)],
            Pacing::immediate(),
        );

        let writes = lights.writes();
        assert_eq!(writes.len(), 4);
        assert!(writes.iter().all(|w| w.var == VariableRef(1)));
        assert_eq!(
            writes.last(),
            Some(&Write {
                var: VariableRef(1),
                value: VariableValue::Switch(true)
            })
        );
    }

    #[test]
    fn test_skips_dark_and_unreachable() {
        let lights = MemoryLights::new();
        lights.insert_dimmer(VariableRef(1), 0);
        lights.insert_dimmer(VariableRef(2), 70);
        lights.set_unreachable(VariableRef(2), true);
        // Dimmer present: no fallback to blinking the switch
        lights.insert_switch(VariableRef(3), true);

        visual_feedback(
            &lights,
            &[LightTarget::full(0, 1, 0), LightTarget::full(3, 2, 0)],
            Pacing::immediate(),
        );

        assert!(lights.writes().is_empty());
    }
}
