//! Action execution
//!
//! Turns a resolved mapping rule into light and automation-zone commands.
//! All backend calls are best effort: an unreachable lamp is logged and
//! skipped, the rest of the batch still runs.

use crate::color_temp;
use crate::config::RemoteProfile;
use crate::dim_hold::{DimDirection, DimHoldController, Scheduler};
use crate::feedback::{visual_feedback, Pacing};
use crate::mapping::ActionType;
use crate::targets::{any_on, best_effort, step_dim_all, switch_all, AutomationZone, LightControl};
use crate::types::LightTarget;
use crate::RemoteError;
use std::borrow::Cow;

/// A fully parsed action, ready to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AllOff,
    DisableAutomation,
    TargetsOnOrCycle,
    TargetsOff,
    /// Relative dim step in percent
    DimStep(i32),
    /// `None` when the parameter resolved to zero
    DimHoldStart(Option<DimDirection>),
    DimHoldStop,
}

impl Action {
    /// Combine an action type with its rule parameter
    pub fn from_parts(action: ActionType, param: &serde_yaml::Value) -> Result<Self, RemoteError> {
        Ok(match action {
            ActionType::RmlAllOff => Self::AllOff,
            ActionType::RmlDisableAutomation => Self::DisableAutomation,
            ActionType::TargetsOnOrCt => Self::TargetsOnOrCycle,
            ActionType::TargetsOff => Self::TargetsOff,
            ActionType::DimStep => Self::DimStep(step_param(param)?),
            ActionType::DimHoldStart => Self::DimHoldStart(
                DimDirection::from_param(param).map_err(RemoteError::InvalidParam)?,
            ),
            ActionType::DimHoldStop => Self::DimHoldStop,
        })
    }

    pub fn action_type(&self) -> ActionType {
        match self {
            Self::AllOff => ActionType::RmlAllOff,
            Self::DisableAutomation => ActionType::RmlDisableAutomation,
            Self::TargetsOnOrCycle => ActionType::TargetsOnOrCt,
            Self::TargetsOff => ActionType::TargetsOff,
            Self::DimStep(_) => ActionType::DimStep,
            Self::DimHoldStart(_) => ActionType::DimHoldStart,
            Self::DimHoldStop => ActionType::DimHoldStop,
        }
    }
}

/// Parse a dim-step parameter (integer or numeric string)
fn step_param(param: &serde_yaml::Value) -> Result<i32, RemoteError> {
    let step = match param {
        serde_yaml::Value::Number(n) => n.as_i64(),
        serde_yaml::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| RemoteError::InvalidParam(format!("invalid dim step {:?}", param)))?;
    Ok(step.clamp(-100, 100) as i32)
}

/// Per-event view of the remote's configuration and backend
pub struct DispatchContext<'a> {
    pub lights: &'a dyn LightControl,
    pub profile: &'a RemoteProfile,
}

impl<'a> DispatchContext<'a> {
    /// The configured automation zone, if it resolves
    fn zone(&self) -> Option<&'a dyn AutomationZone> {
        let zone_ref = self.profile.automation_zone?;
        let zone = self.lights.automation_zone(zone_ref);
        if zone.is_none() {
            log::warn!(
                "[remote {}] {} not found, ignoring",
                self.profile.name,
                zone_ref
            );
        }
        zone
    }
}

/// Executes actions against the light backend
#[derive(Debug, Clone, Default)]
pub struct ActionDispatcher {
    pacing: Pacing,
}

impl ActionDispatcher {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Run one action
    pub fn dispatch<S: Scheduler>(
        &self,
        action: Action,
        ctx: &DispatchContext<'_>,
        dim_hold: &mut DimHoldController<S>,
    ) {
        let name = ctx.profile.name.as_str();
        let targets = ctx.profile.targets.as_slice();
        log::debug!("[remote {}] Dispatching {:?}", name, action);

        match action {
            Action::AllOff => {
                if let Some(zone) = ctx.zone() {
                    if best_effort("enable automation", zone.set_enabled(true)).is_some() {
                        log::info!("[remote {}] Automation zone enabled", name);
                    }
                }
                switch_all(ctx.lights, targets, false);
            }
            Action::DisableAutomation => self.disable_automation(ctx),
            Action::TargetsOnOrCycle => {
                if any_on(ctx.lights, targets) {
                    match color_temp::cycle(ctx.lights, targets, &ctx.profile.color_temp) {
                        Some(value) => log::debug!("[remote {}] Color temperature → {}", name, value),
                        None => log::debug!("[remote {}] No color temperature to cycle", name),
                    }
                } else {
                    switch_all(ctx.lights, targets, true);
                }
            }
            Action::TargetsOff => switch_all(ctx.lights, targets, false),
            Action::DimStep(delta) => step_dim_all(ctx.lights, targets, delta),
            Action::DimHoldStart(Some(direction)) => dim_hold.start(direction),
            Action::DimHoldStart(None) => {
                log::debug!("[remote {}] Dim hold with zero direction ignored", name);
            }
            Action::DimHoldStop => dim_hold.stop(),
        }
    }

    fn disable_automation(&self, ctx: &DispatchContext<'_>) {
        let name = ctx.profile.name.as_str();
        let Some(zone) = ctx.zone() else {
            visual_feedback(ctx.lights, &ctx.profile.targets, self.pacing);
            return;
        };

        if best_effort("disable automation", zone.set_enabled(false)).is_some() {
            log::info!("[remote {}] Automation zone disabled", name);
        }

        let zone_targets: Cow<'_, [LightTarget]> =
            match best_effort("read zone lights", zone.light_targets()) {
                Some(targets) => Cow::Owned(targets),
                None => Cow::Borrowed(&ctx.profile.targets),
            };
        visual_feedback(ctx.lights, &zone_targets, self.pacing);

        let line = format!(
            "{} - Automation disabled via remote '{}'",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            name
        );
        best_effort("append zone log", zone.append_event_log(&line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dim_hold::tests::RecordingScheduler;
    use crate::memory::MemoryLights;
    use crate::types::{VariableRef, ZoneRef};
    use serde_yaml::Value;

    struct Fixture {
        lights: MemoryLights,
        profile: RemoteProfile,
        dim_hold: DimHoldController<RecordingScheduler>,
        dispatcher: ActionDispatcher,
    }

    impl Fixture {
        fn new() -> Self {
            let lights = MemoryLights::new();
            let profile = RemoteProfile {
                name: "test".to_string(),
                targets: vec![LightTarget::full(1, 2, 3), LightTarget::switch(4)],
                ..RemoteProfile::default()
            };
            for target in &profile.targets {
                lights.seed_target(target, 370);
            }
            Self {
                lights,
                profile,
                dim_hold: DimHoldController::new(RecordingScheduler::default()),
                dispatcher: ActionDispatcher::new(Pacing::immediate()),
            }
        }

        fn with_zone(mut self) -> Self {
            self.lights.add_zone(ZoneRef(50), false, vec![LightTarget::full(60, 61, 0)]);
            self.lights.insert_switch(VariableRef(60), true);
            self.lights.insert_dimmer(VariableRef(61), 100);
            self.profile.automation_zone = Some(ZoneRef(50));
            self
        }

        fn run(&mut self, action: Action) {
            let ctx = DispatchContext {
                lights: &self.lights,
                profile: &self.profile,
            };
            self.dispatcher.dispatch(action, &ctx, &mut self.dim_hold);
        }
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Action::from_parts(ActionType::DimStep, &Value::from(-20)),
            Ok(Action::DimStep(-20))
        );
        assert_eq!(
            Action::from_parts(ActionType::DimStep, &Value::from("15")),
            Ok(Action::DimStep(15))
        );
        assert!(matches!(
            Action::from_parts(ActionType::DimStep, &Value::Null),
            Err(RemoteError::InvalidParam(_))
        ));
        assert_eq!(
            Action::from_parts(ActionType::DimHoldStart, &Value::from("up")),
            Ok(Action::DimHoldStart(Some(DimDirection::Up)))
        );
        assert_eq!(
            Action::from_parts(ActionType::TargetsOff, &Value::from("ignored")),
            Ok(Action::TargetsOff)
        );
        for action in ActionType::ALL {
            let param = match action {
                ActionType::DimStep | ActionType::DimHoldStart => Value::from(1),
                _ => Value::Null,
            };
            assert_eq!(Action::from_parts(action, &param).unwrap().action_type(), action);
        }
    }

    #[test]
    fn test_targets_on_when_all_off() {
        let mut f = Fixture::new();
        f.run(Action::TargetsOnOrCycle);
        assert_eq!(f.lights.switch(VariableRef(1)), Some(true));
        assert_eq!(f.lights.switch(VariableRef(4)), Some(true));
        // Switching on doesn't touch color temperature
        assert_eq!(f.lights.color_temp_value(VariableRef(3)), Some(370));
    }

    #[test]
    fn test_targets_on_cycles_when_any_on() {
        let mut f = Fixture::new();
        f.lights.insert_switch(VariableRef(4), true);
        f.run(Action::TargetsOnOrCycle);
        assert_eq!(f.lights.color_temp_value(VariableRef(3)), Some(454));
        assert_eq!(f.lights.switch(VariableRef(1)), Some(false));
    }

    #[test]
    fn test_all_off_enables_zone() {
        let mut f = Fixture::new().with_zone();
        f.lights.insert_switch(VariableRef(1), true);
        f.run(Action::AllOff);
        assert_eq!(f.lights.switch(VariableRef(1)), Some(false));
        assert!(f.lights.zone(ZoneRef(50)).unwrap().is_enabled());
    }

    #[test]
    fn test_all_off_with_unknown_zone() {
        let mut f = Fixture::new();
        f.profile.automation_zone = Some(ZoneRef(999));
        f.lights.insert_switch(VariableRef(4), true);
        f.run(Action::AllOff);
        assert_eq!(f.lights.switch(VariableRef(4)), Some(false));
    }

    #[test]
    fn test_dim_step_clamps() {
        let mut f = Fixture::new();
        f.lights.insert_dimmer(VariableRef(2), 90);
        f.run(Action::DimStep(20));
        assert_eq!(f.lights.dimmer(VariableRef(2)), Some(100));
    }

    #[test]
    fn test_disable_automation_without_zone() {
        let mut f = Fixture::new();
        f.lights.insert_dimmer(VariableRef(2), 50);
        f.run(Action::DisableAutomation);
        // Own dimmer dipped and restored
        assert_eq!(f.lights.writes().len(), 6);
        assert_eq!(f.lights.dimmer(VariableRef(2)), Some(50));
    }

    #[test]
    fn test_disable_automation_with_zone() {
        let mut f = Fixture::new().with_zone();
        f.lights.zone(ZoneRef(50)).unwrap().set_enabled(true).unwrap();
        f.lights.insert_dimmer(VariableRef(2), 50);
        f.run(Action::DisableAutomation);

        let zone = f.lights.zone(ZoneRef(50)).unwrap();
        assert!(!zone.is_enabled());
        let log = zone.event_log();
        assert_eq!(log.len(), 1);
        assert!(log[0].ends_with("Automation disabled via remote 'test'"));

        // Feedback ran on the zone's lamp, not ours
        let writes = f.lights.writes();
        assert_eq!(writes.len(), 6);
        assert!(writes.iter().all(|w| w.var == VariableRef(61)));
    }

    #[test]
    fn test_hold_start_and_stop() {
        let mut f = Fixture::new();
        f.run(Action::DimHoldStart(Some(DimDirection::Down)));
        assert_eq!(f.dim_hold.direction(), Some(DimDirection::Down));
        assert!(f.dim_hold.scheduler().is_armed());

        f.run(Action::DimHoldStart(Some(DimDirection::Up)));
        assert_eq!(f.dim_hold.direction(), Some(DimDirection::Up));

        f.run(Action::DimHoldStop);
        assert_eq!(f.dim_hold.direction(), None);
        assert!(!f.dim_hold.scheduler().is_armed());
    }

    #[test]
    fn test_hold_start_zero_is_noop() {
        let mut f = Fixture::new();
        f.run(Action::DimHoldStart(None));
        assert_eq!(f.dim_hold.direction(), None);
        assert_eq!(f.dim_hold.scheduler().arm_calls, 0);
    }
}
