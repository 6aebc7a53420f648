//! Mock controller backend for testing.
//!
//! This backend logs virtual controller calls instead of sending them to
//! the OS, and records them so tests can inspect the exact sequence.

use super::{ControllerSink, SinkError};
use crate::event::{Side, VirtualAction, VirtualButton};
use log::info;
use std::sync::{Arc, Mutex};

/// One recorded call on the mock sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    Action(VirtualAction),
    Flush,
}

/// Mock sink that logs events instead of sending them.
///
/// Clones share the same record, so a test can keep one handle while the
/// converter owns another.
#[derive(Clone, Debug, Default)]
pub struct MockControllerSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
}

impl MockControllerSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, flushes included.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Only the actions, in order.
    pub fn actions(&self) -> Vec<VirtualAction> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Action(action) => Some(action),
                SinkCall::Flush => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: SinkCall) -> Result<(), SinkError> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| SinkError::Operation("mock record poisoned".into()))?;
        calls.push(call);
        Ok(())
    }

    fn record_action(&self, action: VirtualAction) -> Result<(), SinkError> {
        info!("[MOCK PAD] {}", action);
        self.record(SinkCall::Action(action))
    }
}

impl ControllerSink for MockControllerSink {
    fn press_button(&mut self, button: VirtualButton) -> Result<(), SinkError> {
        self.record_action(VirtualAction::PressButton(button))
    }

    fn release_button(&mut self, button: VirtualButton) -> Result<(), SinkError> {
        self.record_action(VirtualAction::ReleaseButton(button))
    }

    fn set_left_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.record_action(VirtualAction::SetJoystick { stick: Side::Left, x, y })
    }

    fn set_right_stick(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.record_action(VirtualAction::SetJoystick { stick: Side::Right, x, y })
    }

    fn set_left_trigger(&mut self, value: i32) -> Result<(), SinkError> {
        self.record_action(VirtualAction::SetTrigger { side: Side::Left, value })
    }

    fn set_right_trigger(&mut self, value: i32) -> Result<(), SinkError> {
        self.record_action(VirtualAction::SetTrigger { side: Side::Right, value })
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::Flush)
    }
}
