//! uinput virtual gamepad (Linux)
//!
//! Presents an Xbox-style pad to the rest of the system through
//! `/dev/uinput`. Calls are staged as input events and written in one batch
//! on flush, so the kernel sees each converted report as a single frame.

use super::{ControllerSink, SinkError};
use crate::event::VirtualButton;
use evdev::uinput::VirtualDevice;
use evdev::{AbsInfo, AbsoluteAxisCode, AttributeSet, EventType, InputEvent, KeyCode, UinputAbsSetup};
use log::{debug, info};

const STICK_MIN: i32 = i16::MIN as i32;
const STICK_MAX: i32 = i16::MAX as i32;
const STICK_FUZZ: i32 = 16;
const STICK_FLAT: i32 = 128;

const ALL_BUTTONS: [VirtualButton; 14] = [
    VirtualButton::A,
    VirtualButton::B,
    VirtualButton::X,
    VirtualButton::Y,
    VirtualButton::DpadUp,
    VirtualButton::DpadDown,
    VirtualButton::DpadLeft,
    VirtualButton::DpadRight,
    VirtualButton::LeftShoulder,
    VirtualButton::RightShoulder,
    VirtualButton::LeftThumb,
    VirtualButton::RightThumb,
    VirtualButton::Start,
    VirtualButton::Back,
];

fn key_code(button: VirtualButton) -> KeyCode {
    match button {
        VirtualButton::A => KeyCode::BTN_SOUTH,
        VirtualButton::B => KeyCode::BTN_EAST,
        VirtualButton::X => KeyCode::BTN_WEST,
        VirtualButton::Y => KeyCode::BTN_NORTH,
        VirtualButton::DpadUp => KeyCode::BTN_DPAD_UP,
        VirtualButton::DpadDown => KeyCode::BTN_DPAD_DOWN,
        VirtualButton::DpadLeft => KeyCode::BTN_DPAD_LEFT,
        VirtualButton::DpadRight => KeyCode::BTN_DPAD_RIGHT,
        VirtualButton::LeftShoulder => KeyCode::BTN_TL,
        VirtualButton::RightShoulder => KeyCode::BTN_TR,
        VirtualButton::LeftThumb => KeyCode::BTN_THUMBL,
        VirtualButton::RightThumb => KeyCode::BTN_THUMBR,
        VirtualButton::Start => KeyCode::BTN_START,
        VirtualButton::Back => KeyCode::BTN_SELECT,
    }
}

/// Virtual pad backed by a uinput device.
pub struct UinputControllerSink {
    device: VirtualDevice,
    pending: Vec<InputEvent>,
    trigger_max: i32,
}

impl UinputControllerSink {
    /// Register a new virtual pad with the kernel.
    pub fn create(name: &str, trigger_max: i32) -> Result<Self, SinkError> {
        let stick = AbsInfo::new(0, STICK_MIN, STICK_MAX, STICK_FUZZ, STICK_FLAT, 0);
        let trigger = AbsInfo::new(0, 0, trigger_max, 0, 0, 0);

        let mut keys: AttributeSet<KeyCode> = AttributeSet::default();
        for button in ALL_BUTTONS {
            keys.insert(key_code(button));
        }

        let device = VirtualDevice::builder()?
            .name(name)
            .with_keys(&keys)?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_X, stick))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_Y, stick))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_RX, stick))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_RY, stick))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_Z, trigger))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisCode::ABS_RZ, trigger))?
            .build()?;

        info!("✓ Virtual pad '{}' created", name);

        Ok(Self {
            device,
            pending: Vec::with_capacity(8),
            trigger_max,
        })
    }

    fn stage_key(&mut self, button: VirtualButton, value: i32) {
        self.pending
            .push(InputEvent::new(EventType::KEY.0, key_code(button).0, value));
    }

    fn stage_axis(&mut self, axis: AbsoluteAxisCode, value: i32) {
        self.pending
            .push(InputEvent::new(EventType::ABSOLUTE.0, axis.0, value));
    }

    fn stick_value(value: i32) -> i32 {
        value.clamp(STICK_MIN, STICK_MAX)
    }

    fn trigger_value(&self, value: i32) -> i32 {
        value.clamp(0, self.trigger_max)
    }
}

impl ControllerSink for UinputControllerSink {
    fn press_button(&mut self, button: VirtualButton) -> Result<(), SinkError> {
        self.stage_key(button, 1);
        Ok(())
    }

    fn release_button(&mut self, button: VirtualButton) -> Result<(), SinkError> {
        self.stage_key(button, 0);
        Ok(())
    }

    fn set_left_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.stage_axis(AbsoluteAxisCode::ABS_X, Self::stick_value(x));
        self.stage_axis(AbsoluteAxisCode::ABS_Y, Self::stick_value(y));
        Ok(())
    }

    fn set_right_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.stage_axis(AbsoluteAxisCode::ABS_RX, Self::stick_value(x));
        self.stage_axis(AbsoluteAxisCode::ABS_RY, Self::stick_value(y));
        Ok(())
    }

    fn set_left_trigger(&mut self, value: i32) -> Result<(), SinkError> {
        let value = self.trigger_value(value);
        self.stage_axis(AbsoluteAxisCode::ABS_Z, value);
        Ok(())
    }

    fn set_right_trigger(&mut self, value: i32) -> Result<(), SinkError> {
        let value = self.trigger_value(value);
        self.stage_axis(AbsoluteAxisCode::ABS_RZ, value);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        debug!("uinput: committing {} events", self.pending.len());
        // emit() appends the SYN_REPORT terminating the frame
        let result = self.device.emit(&self.pending);
        self.pending.clear();
        result.map_err(SinkError::from)
    }
}
