//! Static code tables used by the converter
//!
//! Maps physical button codes to virtual buttons, names the axis codes the
//! converter understands, and lists the guide-button chord reports that must
//! not be treated as axis motion.

use crate::event::VirtualButton;
use log::debug;
use std::collections::HashMap;

pub const LEFT_STICK_X: &str = "ABS_X";
pub const LEFT_STICK_Y: &str = "ABS_Y";
pub const RIGHT_STICK_X: &str = "ABS_RX";
pub const RIGHT_STICK_Y: &str = "ABS_RY";
pub const LEFT_TRIGGER: &str = "ABS_Z";
pub const RIGHT_TRIGGER: &str = "ABS_RZ";
pub const HAT_X: &str = "ABS_HAT0X";
pub const HAT_Y: &str = "ABS_HAT0Y";

/// Suffix for a hat reporting +1.
pub const HAT_POSITIVE: &str = "POS";
/// Suffix for a hat reporting -1.
pub const HAT_NEGATIVE: &str = "NEG";

/// Reports the pad's input layer emits instead of a dedicated guide-button code.
///
/// The first four open the sequence, the last four close it. Matching is on
/// single (code, value) pairs, so a genuine report equal to one of these is
/// dropped as well.
pub const GUIDE_CHORD: [(&str, i32); 8] = [
    (LEFT_STICK_X, 0),
    (LEFT_STICK_Y, -1),
    (RIGHT_STICK_X, 0),
    (RIGHT_STICK_Y, -1),
    (LEFT_STICK_Y, 0),
    (RIGHT_STICK_Y, 0),
    (LEFT_STICK_Y, -1),
    (RIGHT_STICK_Y, -1),
];

/// Whether `(code, value)` is one of the guide-button chord reports.
pub fn is_guide_chord(code: &str, value: i32) -> bool {
    GUIDE_CHORD.iter().any(|&(c, v)| c == code && v == value)
}

/// Derived key code for a hat direction, e.g. `ABS_HAT0X_POS`.
pub fn hat_code(axis: &str, suffix: &str) -> String {
    format!("{}_{}", axis, suffix)
}

/// Suffix for a pressed hat value, `None` for neutral (or anything else).
pub fn hat_suffix(value: i32) -> Option<&'static str> {
    match value {
        1 => Some(HAT_POSITIVE),
        -1 => Some(HAT_NEGATIVE),
        _ => None,
    }
}

/// Code-to-button lookup, fixed once a converter is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMap {
    entries: HashMap<String, VirtualButton>,
}

impl ButtonMap {
    /// The default Xbox-style layout (14 entries).
    pub fn xbox() -> Self {
        let entries = [
            ("BTN_SOUTH", VirtualButton::A),
            ("BTN_EAST", VirtualButton::B),
            ("BTN_WEST", VirtualButton::X),
            ("BTN_NORTH", VirtualButton::Y),
            ("ABS_HAT0X_NEG", VirtualButton::DpadLeft),
            ("ABS_HAT0X_POS", VirtualButton::DpadRight),
            ("ABS_HAT0Y_NEG", VirtualButton::DpadUp),
            ("ABS_HAT0Y_POS", VirtualButton::DpadDown),
            ("BTN_TR", VirtualButton::RightShoulder),
            ("BTN_TL", VirtualButton::LeftShoulder),
            ("BTN_THUMBR", VirtualButton::RightThumb),
            ("BTN_THUMBL", VirtualButton::LeftThumb),
            ("BTN_START", VirtualButton::Start),
            ("BTN_SELECT", VirtualButton::Back),
        ]
        .into_iter()
        .map(|(code, button)| (code.to_string(), button))
        .collect();

        Self { entries }
    }

    /// Default layout with per-code overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<String, VirtualButton>) -> Self {
        let mut map = Self::xbox();
        for (code, button) in overrides {
            debug!("Button override: {} -> {:?}", code, button);
            map.entries.insert(code.clone(), *button);
        }
        map
    }

    pub fn get(&self, code: &str) -> Option<VirtualButton> {
        self.entries.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self::xbox()
    }
}
