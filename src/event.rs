//! Event data model
//!
//! Raw input reports as they travel over the wire, and the virtual
//! controller actions the converter produces from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of raw input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Continuous axis (sticks, triggers, hat).
    Absolute,
    /// Step input (buttons).
    Key,
    /// End-of-report marker, never forwarded.
    Sync,
    /// Anything else the device reports (misc, leds, ...).
    Other,
}

impl EventType {
    /// Whether events of this type cross the transport.
    pub fn is_forwarded(self) -> bool {
        matches!(self, EventType::Absolute | EventType::Key)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Absolute => "Absolute",
            EventType::Key => "Key",
            EventType::Sync => "Sync",
            EventType::Other => "Other",
        };
        f.write_str(name)
    }
}

/// One physical state change reported by the pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub code: String,
    pub value: i32,
}

impl RawEvent {
    pub fn new(event_type: EventType, code: impl Into<String>, value: i32) -> Self {
        Self {
            event_type,
            code: code.into(),
            value,
        }
    }

    pub fn key(code: impl Into<String>, value: i32) -> Self {
        Self::new(EventType::Key, code, value)
    }

    pub fn absolute(code: impl Into<String>, value: i32) -> Self {
        Self::new(EventType::Absolute, code, value)
    }

    pub fn sync() -> Self {
        Self::new(EventType::Sync, "SYN_REPORT", 0)
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.event_type, self.code, self.value)
    }
}

/// Buttons of the virtual (Xbox-style) pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VirtualButton {
    A,
    B,
    X,
    Y,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    LeftShoulder,
    RightShoulder,
    LeftThumb,
    RightThumb,
    Start,
    Back,
}

/// Left or right stick / trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// A discrete action applied to the virtual controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualAction {
    PressButton(VirtualButton),
    ReleaseButton(VirtualButton),
    SetJoystick { stick: Side, x: i32, y: i32 },
    SetTrigger { side: Side, value: i32 },
}

impl fmt::Display for VirtualAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualAction::PressButton(button) => write!(f, "press_button {:?}", button),
            VirtualAction::ReleaseButton(button) => write!(f, "release_button {:?}", button),
            VirtualAction::SetJoystick { stick: Side::Left, x, y } => {
                write!(f, "left_joystick ({}, {})", x, y)
            }
            VirtualAction::SetJoystick { stick: Side::Right, x, y } => {
                write!(f, "right_joystick ({}, {})", x, y)
            }
            VirtualAction::SetTrigger { side: Side::Left, value } => {
                write!(f, "left_trigger {}", value)
            }
            VirtualAction::SetTrigger { side: Side::Right, value } => {
                write!(f, "right_trigger {}", value)
            }
        }
    }
}
