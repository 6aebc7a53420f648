//! Backend abstraction for the virtual controller
//!
//! This module provides a unified interface for driving a simulated game
//! controller, so the converter never talks to an OS driver directly.

pub mod mock_controller;
#[cfg(target_os = "linux")]
pub mod uinput;

pub use mock_controller::{MockControllerSink, SinkCall};
#[cfg(target_os = "linux")]
pub use uinput::UinputControllerSink;

use crate::event::{Side, VirtualAction, VirtualButton};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Virtual controller I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Virtual controller operation failed: {0}")]
    Operation(String),

    #[error("Platform not supported")]
    PlatformNotSupported,
}

/// Unified backend interface for a virtual game controller.
///
/// Setters stage state; nothing reaches the OS device until [`flush`] is
/// called, which commits everything staged since the previous flush.
///
/// [`flush`]: ControllerSink::flush
pub trait ControllerSink {
    fn press_button(&mut self, button: VirtualButton) -> Result<(), SinkError>;

    fn release_button(&mut self, button: VirtualButton) -> Result<(), SinkError>;

    fn set_left_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError>;

    fn set_right_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError>;

    fn set_left_trigger(&mut self, value: i32) -> Result<(), SinkError>;

    fn set_right_trigger(&mut self, value: i32) -> Result<(), SinkError>;

    /// Commit the staged state to the device.
    fn flush(&mut self) -> Result<(), SinkError>;

    /// Apply one converter action
    fn apply(&mut self, action: &VirtualAction) -> Result<(), SinkError> {
        match *action {
            VirtualAction::PressButton(button) => self.press_button(button),
            VirtualAction::ReleaseButton(button) => self.release_button(button),
            VirtualAction::SetJoystick { stick: Side::Left, x, y } => self.set_left_stick(x, y),
            VirtualAction::SetJoystick { stick: Side::Right, x, y } => self.set_right_stick(x, y),
            VirtualAction::SetTrigger { side: Side::Left, value } => self.set_left_trigger(value),
            VirtualAction::SetTrigger { side: Side::Right, value } => self.set_right_trigger(value),
        }
    }
}

impl<T: ControllerSink + ?Sized> ControllerSink for Box<T> {
    fn press_button(&mut self, button: VirtualButton) -> Result<(), SinkError> {
        (**self).press_button(button)
    }

    fn release_button(&mut self, button: VirtualButton) -> Result<(), SinkError> {
        (**self).release_button(button)
    }

    fn set_left_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        (**self).set_left_stick(x, y)
    }

    fn set_right_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        (**self).set_right_stick(x, y)
    }

    fn set_left_trigger(&mut self, value: i32) -> Result<(), SinkError> {
        (**self).set_left_trigger(value)
    }

    fn set_right_trigger(&mut self, value: i32) -> Result<(), SinkError> {
        (**self).set_right_trigger(value)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// Create the OS virtual controller for the current platform
#[cfg(target_os = "linux")]
pub fn get_controller_sink(
    device_name: &str,
    trigger_max: i32,
) -> Result<UinputControllerSink, SinkError> {
    UinputControllerSink::create(device_name, trigger_max)
}

#[cfg(not(target_os = "linux"))]
pub fn get_controller_sink(
    _device_name: &str,
    _trigger_max: i32,
) -> Result<MockControllerSink, SinkError> {
    Err(SinkError::PlatformNotSupported)
}

/// Get a mock controller sink that only logs what it receives
pub fn get_mock_controller_sink() -> MockControllerSink {
    MockControllerSink::new()
}
