//! Converter - turns raw input reports into virtual controller actions
//!
//! This is the core of the emitting side. It receives raw events one at a
//! time, keeps the last seen value of every axis, and drives the virtual
//! controller sink with the resulting button, stick and trigger actions.

use crate::backend::ControllerSink;
use crate::event::{EventType, RawEvent, Side, VirtualAction};
use crate::mapping::buttons::{
    self, ButtonMap, HAT_NEGATIVE, HAT_POSITIVE, HAT_X, HAT_Y, LEFT_STICK_X, LEFT_STICK_Y,
    LEFT_TRIGGER, RIGHT_STICK_X, RIGHT_STICK_Y, RIGHT_TRIGGER,
};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Last seen value per axis code.
///
/// Only codes that have been observed are stored; reads of unseen codes
/// yield 0.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AxisState {
    values: HashMap<String, i32>,
}

impl AxisState {
    pub fn get(&self, code: &str) -> i32 {
        self.values.get(code).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn set(&mut self, code: &str, value: i32) {
        self.values.insert(code.to_string(), value);
    }

    fn pair(&self, x_code: &str, y_code: &str) -> (i32, i32) {
        (self.get(x_code), self.get(y_code))
    }
}

/// Converts raw events into virtual controller actions
pub struct Converter<K: ControllerSink> {
    buttons: ButtonMap,
    axes: AxisState,
    sink: K,
}

impl<K: ControllerSink> Converter<K> {
    /// Create a converter with the default button layout
    pub fn new(sink: K) -> Self {
        Self::with_buttons(ButtonMap::default(), sink)
    }

    pub fn with_buttons(buttons: ButtonMap, sink: K) -> Self {
        Self {
            buttons,
            axes: AxisState::default(),
            sink,
        }
    }

    pub fn axis_state(&self) -> &AxisState {
        &self.axes
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Convert one event and apply the result to the sink.
    ///
    /// Every action is applied and committed before this returns. Sink
    /// failures are logged and do not stop the remaining actions.
    pub fn convert(&mut self, event: &RawEvent) -> Vec<VirtualAction> {
        let actions = self.translate(event);

        for action in &actions {
            if let Err(e) = self.sink.apply(action) {
                warn!("Failed to apply '{}': {}", action, e);
            }
        }
        if let Err(e) = self.sink.flush() {
            warn!("Failed to commit virtual controller state: {}", e);
        }

        actions
    }

    /// Compute the actions for one event, updating axis state, without
    /// touching the sink.
    pub fn translate(&mut self, event: &RawEvent) -> Vec<VirtualAction> {
        debug!(
            "Converting event ev_type={} code={} state={}",
            event.event_type, event.code, event.value
        );

        let mut actions = Vec::new();
        match event.event_type {
            EventType::Absolute => self.on_absolute(&event.code, event.value, &mut actions),
            EventType::Key => self.on_key(&event.code, event.value, &mut actions),
            EventType::Sync | EventType::Other => {
                warn!("unknown event type: {}", event.event_type);
            }
        }
        actions
    }

    /// Button events
    fn on_key(&self, code: &str, value: i32, actions: &mut Vec<VirtualAction>) {
        let Some(button) = self.buttons.get(code) else {
            warn!("unknown key code: {} with state {}", code, value);
            return;
        };

        let action = if value != 0 {
            VirtualAction::PressButton(button)
        } else {
            VirtualAction::ReleaseButton(button)
        };
        info!("{}", action);
        actions.push(action);
    }

    /// Axis events
    fn on_absolute(&mut self, code: &str, value: i32, actions: &mut Vec<VirtualAction>) {
        if buttons::is_guide_chord(code, value) {
            info!("xbox_button ({} = {} suppressed)", code, value);
            return;
        }

        self.axes.set(code, value);

        let action = match code {
            LEFT_STICK_X | LEFT_STICK_Y => {
                let (x, y) = self.axes.pair(LEFT_STICK_X, LEFT_STICK_Y);
                VirtualAction::SetJoystick { stick: Side::Left, x, y }
            }
            RIGHT_STICK_X | RIGHT_STICK_Y => {
                let (x, y) = self.axes.pair(RIGHT_STICK_X, RIGHT_STICK_Y);
                VirtualAction::SetJoystick { stick: Side::Right, x, y }
            }
            LEFT_TRIGGER => VirtualAction::SetTrigger { side: Side::Left, value },
            RIGHT_TRIGGER => VirtualAction::SetTrigger { side: Side::Right, value },
            HAT_X | HAT_Y => {
                self.on_hat(code, value, actions);
                return;
            }
            _ => {
                warn!("unknown absolute code: {} with state {}", code, value);
                return;
            }
        };

        info!("{}", action);
        actions.push(action);
    }

    /// D-pad axes report -1/0/+1; a neutral report releases both directions
    /// because the previous direction is not known.
    fn on_hat(&self, axis: &str, value: i32, actions: &mut Vec<VirtualAction>) {
        match buttons::hat_suffix(value) {
            Some(suffix) => self.on_key(&buttons::hat_code(axis, suffix), 1, actions),
            None => {
                for suffix in [HAT_POSITIVE, HAT_NEGATIVE] {
                    self.on_key(&buttons::hat_code(axis, suffix), 0, actions);
                }
            }
        }
    }
}
