//! Action-string classification
//!
//! Remotes report free-form action strings such as `on_press_release` or
//! `up_hold_release`. Vendors disagree on the exact spelling, so matching is
//! case-insensitive and substring based, evaluated in a fixed priority order.
//!
//! ```text
//! "up_press_hold"          → (up, hold_start)
//! "up_press_hold_release"  → (up, hold_stop)
//! "on_press_hold_release"  → (on, long)      ← still needs the duration gate
//! "off_press_release"      → (off, short)
//! "on_press"               → (on, none)      ← dropped
//! ```

use crate::types::{Button, ClassifiedGesture, Gesture};

/// Underscore-prefixed button names, tested with `starts_with` first
const BUTTON_PREFIXES: &[(&str, Button)] = &[
    ("on_", Button::On),
    ("off_", Button::Off),
    ("up_", Button::Up),
    ("down_", Button::Down),
];

/// Bare button names for vendor variants without the prefix convention.
/// `off` must come before `on`.
const BUTTON_SUBSTRINGS: &[(&str, Button)] = &[
    ("off", Button::Off),
    ("on", Button::On),
    ("up", Button::Up),
    ("down", Button::Down),
];

/// How a matched gesture pattern resolves for a given button
#[derive(Debug, Clone, Copy)]
enum GestureRule {
    /// on/off → long candidate, up/down → hold stop
    Release,
    /// Any button → hold start
    HoldStart,
    /// up/down → hold start, on/off → nothing
    DirectionalHoldStart,
    /// Any button → short
    Short,
}

impl GestureRule {
    fn apply(self, button: Button) -> Option<Gesture> {
        match self {
            Self::Release if button.is_directional() => Some(Gesture::HoldStop),
            Self::Release => Some(Gesture::Long),
            Self::HoldStart => Some(Gesture::HoldStart),
            Self::DirectionalHoldStart if button.is_directional() => Some(Gesture::HoldStart),
            // on/off long presses are only announced at release
            Self::DirectionalHoldStart => None,
            Self::Short => Some(Gesture::Short),
        }
    }
}

/// Gesture patterns in priority order; first substring hit wins.
/// A bare `_press` matches nothing and is ignored.
const GESTURE_PATTERNS: &[(&str, GestureRule)] = &[
    ("_press_hold_release", GestureRule::Release),
    ("_hold_release", GestureRule::Release),
    ("_press_hold", GestureRule::HoldStart),
    ("_hold", GestureRule::DirectionalHoldStart),
    ("_press_release", GestureRule::Short),
];

/// Classify a raw action string into a (button, gesture) pair
///
/// Total and deterministic. `Gesture::Long` in the result is only a
/// candidate: callers must confirm it with [`confirm_long`].
pub fn classify(raw: &str) -> ClassifiedGesture {
    let lower = raw.trim().to_lowercase();

    let button = classify_button(&lower);
    let gesture = button.and_then(|button| {
        GESTURE_PATTERNS
            .iter()
            .find(|(pattern, _)| lower.contains(pattern))
            .and_then(|(_, rule)| rule.apply(button))
    });

    ClassifiedGesture { button, gesture }
}

fn classify_button(lower: &str) -> Option<Button> {
    BUTTON_PREFIXES
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .or_else(|| {
            BUTTON_SUBSTRINGS
                .iter()
                .find(|(name, _)| lower.contains(name))
        })
        .map(|(_, button)| *button)
}

/// Confirm a long-press candidate against the hold threshold
///
/// Unknown durations arrive here as 0.0 and only pass a zero threshold.
pub fn confirm_long(observed_duration_secs: f64, threshold_secs: f64) -> bool {
    observed_duration_secs >= threshold_secs
}
