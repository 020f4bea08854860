//! Button-to-action mapping table
//!
//! Maps classified (button, gesture) pairs to configured actions. Rules are
//! scanned in order and the first structural match wins. An empty table falls
//! back to two built-in rules so a freshly installed remote can still switch
//! everything off and disable the automation zone.

use crate::types::{Button, Gesture};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action kinds understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Enable the automation zone and switch every target off
    RmlAllOff,
    /// Disable the automation zone with visual feedback
    RmlDisableAutomation,
    /// Switch targets on, or cycle color temperature if any is already on
    TargetsOnOrCt,
    /// Switch every target off
    TargetsOff,
    /// Relative dim step by `param`
    DimStep,
    /// Start continuous dimming in the `param` direction
    DimHoldStart,
    /// Stop continuous dimming
    DimHoldStop,
}

impl ActionType {
    pub const ALL: [ActionType; 7] = [
        Self::RmlAllOff,
        Self::RmlDisableAutomation,
        Self::TargetsOnOrCt,
        Self::TargetsOff,
        Self::DimStep,
        Self::DimHoldStart,
        Self::DimHoldStop,
    ];

    /// Canonical configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RmlAllOff => "RML_ALL_OFF",
            Self::RmlDisableAutomation => "RML_DISABLE_AUTOMATION",
            Self::TargetsOnOrCt => "TARGETS_ON_OR_CT",
            Self::TargetsOff => "TARGETS_OFF",
            Self::DimStep => "DIM_STEP",
            Self::DimHoldStart => "DIM_HOLD_START",
            Self::DimHoldStop => "DIM_HOLD_STOP",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for action names that don't name any [`ActionType`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action type '{0}'")]
pub struct UnknownActionType(pub String);

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownActionType(trimmed.to_string()))
    }
}

/// One button-map entry
///
/// `action` stays textual so a table loaded from an older or hand-edited file
/// still loads; unknown names are reported at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRule {
    pub button: Button,
    pub gesture: Gesture,
    /// Action type name (e.g. "DIM_STEP")
    pub action: String,
    /// Action parameter: step size, direction token or empty
    #[serde(default, skip_serializing_if = "serde_yaml::Value::is_null")]
    pub param: serde_yaml::Value,
}

impl MappingRule {
    /// Rule without a parameter
    pub fn new(button: Button, gesture: Gesture, action: ActionType) -> Self {
        Self {
            button,
            gesture,
            action: action.as_str().to_string(),
            param: serde_yaml::Value::Null,
        }
    }

    /// Attach a parameter
    pub fn with_param(mut self, param: impl Into<serde_yaml::Value>) -> Self {
        self.param = param.into();
        self
    }

    /// Structural match on button and gesture
    pub fn matches(&self, button: Button, gesture: Gesture) -> bool {
        self.button == button && self.gesture == gesture
    }

    /// Parsed action type
    pub fn action_type(&self) -> Result<ActionType, UnknownActionType> {
        self.action.parse()
    }
}

/// Ordered rule table with the empty-table fallback
#[derive(Debug, Clone)]
pub struct MappingTable {
    rules: Vec<MappingRule>,
    fallback: Vec<MappingRule>,
}

impl MappingTable {
    /// Build a table from configured rules
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self {
            rules,
            fallback: fallback_rules(),
        }
    }

    /// Find the rule for a classified event
    ///
    /// Configured tables are authoritative: the fallback only applies when
    /// no rules are configured at all.
    pub fn resolve(&self, button: Button, gesture: Gesture) -> Option<&MappingRule> {
        let rules = if self.rules.is_empty() {
            &self.fallback
        } else {
            &self.rules
        };
        rules.iter().find(|rule| rule.matches(button, gesture))
    }

    /// Configured rules (empty when running on the fallback)
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Built-in rules used while the table is empty
fn fallback_rules() -> Vec<MappingRule> {
    vec![
        MappingRule::new(Button::Off, Gesture::Short, ActionType::RmlAllOff),
        MappingRule::new(Button::On, Gesture::Long, ActionType::RmlDisableAutomation),
    ]
}

/// The nine-rule default profile for a four-button dimmer remote
///
/// `short_step` is the dim step used for short up/down presses.
pub fn default_profile(short_step: i64) -> Vec<MappingRule> {
    vec![
        MappingRule::new(Button::On, Gesture::Short, ActionType::TargetsOnOrCt),
        MappingRule::new(Button::Off, Gesture::Short, ActionType::RmlAllOff),
        MappingRule::new(Button::Up, Gesture::Short, ActionType::DimStep).with_param(short_step),
        MappingRule::new(Button::Down, Gesture::Short, ActionType::DimStep).with_param(-short_step),
        MappingRule::new(Button::Up, Gesture::HoldStart, ActionType::DimHoldStart).with_param("up"),
        MappingRule::new(Button::Up, Gesture::HoldStop, ActionType::DimHoldStop),
        MappingRule::new(Button::Down, Gesture::HoldStart, ActionType::DimHoldStart)
            .with_param("down"),
        MappingRule::new(Button::Down, Gesture::HoldStop, ActionType::DimHoldStop),
        MappingRule::new(Button::On, Gesture::Long, ActionType::RmlDisableAutomation),
    ]
}
