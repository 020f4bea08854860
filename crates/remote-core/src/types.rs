//! Remote event and light target types
//!
//! These types are shared by the classifier, the mapping table, the
//! dispatcher and the light backends. They carry no behaviour beyond
//! small conversions.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Physical button on the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    On,
    Off,
    Up,
    Down,
}

impl Button {
    /// Whether this is one of the brightness rocker buttons
    pub fn is_directional(&self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// Semantic meaning of a button event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// Pressed and released
    Short,
    /// Held and released past the hold threshold (on/off only)
    Long,
    /// Hold started (up/down)
    HoldStart,
    /// Hold released (up/down)
    HoldStop,
}

/// One action-string update from the event source
///
/// Produced once per notification and consumed synchronously.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    /// Raw action string as decoded by the radio layer (e.g. "on_press_release")
    pub raw: String,
    /// Duration the button was held, 0.0 when the source doesn't report one
    pub observed_duration_secs: f64,
}

impl ActionEvent {
    /// Create an event without duration information
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            observed_duration_secs: 0.0,
        }
    }

    /// Create an event from a raw string and an optional duration reading
    ///
    /// A missing duration is treated as 0.0, which fails any positive hold threshold.
    pub fn with_duration(raw: impl Into<String>, duration_secs: Option<f64>) -> Self {
        Self {
            raw: raw.into(),
            observed_duration_secs: duration_secs.unwrap_or(0.0),
        }
    }
}

/// Classifier output
///
/// Either half may be missing, in which case no rule can match and the
/// event is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifiedGesture {
    pub button: Option<Button>,
    pub gesture: Option<Gesture>,
}

impl ClassifiedGesture {
    /// Both halves, if the event is actionable
    pub fn resolved(&self) -> Option<(Button, Gesture)> {
        Some((self.button?, self.gesture?))
    }
}

/// Reference into the light backend's variable space
///
/// Zero is never a valid reference; configs use it for "not set".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableRef(pub u32);

impl VariableRef {
    /// Build a reference, mapping 0 to `None`
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to an automation zone instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneRef(pub u32);

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone #{}", self.0)
    }
}

/// An addressable light
///
/// Any of the three references may be absent. Absent references are skipped
/// by every operation, never treated as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightTarget {
    #[serde(default, deserialize_with = "nonzero_ref", skip_serializing_if = "Option::is_none")]
    pub switch: Option<VariableRef>,
    #[serde(default, deserialize_with = "nonzero_ref", skip_serializing_if = "Option::is_none")]
    pub dimmer: Option<VariableRef>,
    #[serde(default, deserialize_with = "nonzero_ref", skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<VariableRef>,
}

impl LightTarget {
    /// Target with only a switch
    pub fn switch(id: u32) -> Self {
        Self {
            switch: VariableRef::new(id),
            ..Self::default()
        }
    }

    /// Target with switch, dimmer and color temperature (0 = absent)
    pub fn full(switch: u32, dimmer: u32, color_temp: u32) -> Self {
        Self {
            switch: VariableRef::new(switch),
            dimmer: VariableRef::new(dimmer),
            color_temp: VariableRef::new(color_temp),
        }
    }

    /// All populated references
    pub fn refs(&self) -> impl Iterator<Item = VariableRef> {
        [self.switch, self.dimmer, self.color_temp].into_iter().flatten()
    }
}

/// Deserialize a variable id where 0 (or null) means "not set"
fn nonzero_ref<'de, D>(deserializer: D) -> Result<Option<VariableRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<u32>::deserialize(deserializer)?;
    Ok(id.and_then(VariableRef::new))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classified_resolved() {
        let full = ClassifiedGesture {
            button: Some(Button::On),
            gesture: Some(Gesture::Short),
        };
        assert_eq!(full.resolved(), Some((Button::On, Gesture::Short)));

        let partial = ClassifiedGesture {
            button: Some(Button::Up),
            gesture: None,
        };
        assert_eq!(partial.resolved(), None);
        assert_eq!(ClassifiedGesture::default().resolved(), None);
    }

    #[test]
    fn test_missing_duration_is_zero() {
        let event = ActionEvent::with_duration("on_press_hold_release", None);
        assert_eq!(event.observed_duration_secs, 0.0);

        let event = ActionEvent::with_duration("on_press_hold_release", Some(2.5));
        assert_eq!(event.observed_duration_secs, 2.5);
    }

    #[test]
    fn test_zero_reference_is_absent() {
        let yaml = "switch: 12001\ndimmer: 0\n";
        let target: LightTarget = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(target.switch, Some(VariableRef(12001)));
        assert_eq!(target.dimmer, None);
        assert_eq!(target.color_temp, None);
        assert_eq!(target.refs().count(), 1);
    }

    #[test]
    fn test_gesture_serde_names() {
        let yaml = serde_yaml::to_string(&Gesture::HoldStart).unwrap();
        assert_eq!(yaml.trim(), "hold_start");
        let parsed: Button = serde_yaml::from_str("down").unwrap();
        assert_eq!(parsed, Button::Down);
    }
}
