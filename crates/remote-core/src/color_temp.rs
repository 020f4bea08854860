//! Color temperature cycling
//!
//! Pressing "on" while the lights are already on steps through a short
//! ladder of color temperatures (cold → neutral → warm → cold ...). The
//! current position isn't stored; it is re-detected from the lamps on every
//! press so changes made elsewhere are picked up.

use crate::targets::{best_effort, LightControl};
use crate::types::LightTarget;
use serde::{Deserialize, Serialize};

/// Configured ladder points. Values ≤ 0 disable that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTempLadder {
    pub cold: i32,
    pub neutral: i32,
    pub warm: i32,
}

impl Default for ColorTempLadder {
    fn default() -> Self {
        Self {
            cold: 250,
            neutral: 370,
            warm: 454,
        }
    }
}

impl ColorTempLadder {
    /// Active ladder values in cold → neutral → warm order
    pub fn values(&self) -> Vec<u32> {
        [self.cold, self.neutral, self.warm]
            .into_iter()
            .filter_map(|v| u32::try_from(v).ok().filter(|v| *v > 0))
            .collect()
    }
}

/// Detect the current ladder slot
///
/// Only the first target with a color-temperature reference and a readable
/// value is inspected. Returns `None` when that value is off-ladder or no
/// target can be read.
pub fn detect_slot(lights: &dyn LightControl, targets: &[LightTarget], ladder: &[u32]) -> Option<usize> {
    let current = targets
        .iter()
        .filter_map(|t| t.color_temp)
        .find_map(|var| best_effort("read color temp", lights.color_temp(var)))?;
    ladder.iter().position(|v| *v == current)
}

/// Slot following `current`, wrapping; unknown positions restart at 0
pub fn next_slot(current: Option<usize>, len: usize) -> usize {
    match current {
        Some(i) if len > 0 => (i + 1) % len,
        _ => 0,
    }
}

/// Advance every target to the next ladder value
///
/// Returns the value applied, or `None` when nothing was written (empty
/// ladder, or no target has a color-temperature reference).
pub fn cycle(lights: &dyn LightControl, targets: &[LightTarget], ladder: &ColorTempLadder) -> Option<u32> {
    let values = ladder.values();
    if values.is_empty() {
        return None;
    }
    if !targets.iter().any(|t| t.color_temp.is_some()) {
        return None;
    }

    let slot = next_slot(detect_slot(lights, targets, &values), values.len());
    let value = values[slot];

    for var in targets.iter().filter_map(|t| t.color_temp) {
        best_effort("set color temp", lights.set_color_temp(var, value));
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLights;
    use crate::types::VariableRef;

    fn setup(values: &[(u32, u32)]) -> (MemoryLights, Vec<LightTarget>) {
        let lights = MemoryLights::new();
        let mut targets = Vec::new();
        for (var, ct) in values {
            lights.insert_color_temp(VariableRef(*var), *ct);
            targets.push(LightTarget::full(0, 0, *var));
        }
        (lights, targets)
    }

    #[test]
    fn test_ladder_filters_disabled_points() {
        assert_eq!(ColorTempLadder::default().values(), vec![250, 370, 454]);
        let ladder = ColorTempLadder {
            cold: 0,
            neutral: 370,
            warm: -1,
        };
        assert_eq!(ladder.values(), vec![370]);
    }

    #[test]
    fn test_next_slot() {
        assert_eq!(next_slot(Some(0), 3), 1);
        assert_eq!(next_slot(Some(2), 3), 0);
        assert_eq!(next_slot(None, 3), 0);
        assert_eq!(next_slot(Some(0), 1), 0);
    }

    #[test]
    fn test_cycle_from_neutral() {
        let (lights, targets) = setup(&[(1, 370), (2, 250)]);
        assert_eq!(cycle(&lights, &targets, &ColorTempLadder::default()), Some(454));
        assert_eq!(lights.color_temp_value(VariableRef(1)), Some(454));
        assert_eq!(lights.color_temp_value(VariableRef(2)), Some(454));
    }

    #[test]
    fn test_cycle_wraps() {
        let (lights, targets) = setup(&[(1, 454)]);
        assert_eq!(cycle(&lights, &targets, &ColorTempLadder::default()), Some(250));
    }

    #[test]
    fn test_cycle_off_ladder_restarts() {
        let (lights, targets) = setup(&[(1, 999)]);
        assert_eq!(cycle(&lights, &targets, &ColorTempLadder::default()), Some(250));
    }

    #[test]
    fn test_detection_uses_first_readable_target() {
        let (lights, targets) = setup(&[(1, 250), (2, 370)]);
        lights.set_unreachable(VariableRef(1), true);
        // First target unreadable → second decides
        assert_eq!(detect_slot(&lights, &targets, &[250, 370, 454]), Some(1));
    }

    #[test]
    fn test_no_color_temp_targets_is_noop() {
        let lights = MemoryLights::new();
        lights.insert_switch(VariableRef(1), true);
        let targets = [LightTarget::switch(1)];
        assert_eq!(cycle(&lights, &targets, &ColorTempLadder::default()), None);
        assert!(lights.writes().is_empty());
    }

    #[test]
    fn test_empty_ladder_is_noop() {
        let (lights, targets) = setup(&[(1, 370)]);
        let ladder = ColorTempLadder {
            cold: 0,
            neutral: 0,
            warm: 0,
        };
        assert_eq!(cycle(&lights, &targets, &ladder), None);
        assert!(lights.writes().is_empty());
    }
}
