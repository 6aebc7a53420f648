//! evdev gamepad source (Linux)
//!
//! Reads a physical pad from `/dev/input/event*` and reports its events with
//! the kernel mnemonic (`BTN_SOUTH`, `ABS_X`, ...) as the code.

use super::{RawEventSource, SourceError};
use crate::event::{EventType, RawEvent};
use evdev::{AbsoluteAxisCode, Device, KeyCode};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// A gamepad found during enumeration.
#[derive(Debug, Clone)]
pub struct GamepadInfo {
    pub path: PathBuf,
    pub name: String,
}

fn is_gamepad(device: &Device) -> bool {
    device
        .supported_keys()
        .map_or(false, |keys| keys.contains(KeyCode::BTN_SOUTH))
}

/// Every input device that looks like a gamepad, sorted by path.
pub fn list_gamepads() -> Vec<GamepadInfo> {
    let mut pads: Vec<GamepadInfo> = evdev::enumerate()
        .filter(|(_, device)| is_gamepad(device))
        .map(|(path, device)| GamepadInfo {
            name: device.name().unwrap_or("Unknown").to_string(),
            path,
        })
        .collect();
    pads.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Found {} gamepads", pads.len());
    pads
}

fn to_raw_event(event: &evdev::InputEvent) -> RawEvent {
    let event_type = event.event_type();
    if event_type == evdev::EventType::KEY {
        RawEvent::key(format!("{:?}", KeyCode::new(event.code())), event.value())
    } else if event_type == evdev::EventType::ABSOLUTE {
        RawEvent::absolute(format!("{:?}", AbsoluteAxisCode(event.code())), event.value())
    } else if event_type == evdev::EventType::SYNCHRONIZATION {
        RawEvent::sync()
    } else {
        RawEvent::new(EventType::Other, format!("{}", event.code()), event.value())
    }
}

/// Physical pad opened through evdev.
pub struct EvdevSource {
    device: Device,
}

impl EvdevSource {
    /// Open a device by path, optionally taking exclusive access.
    pub fn open<P: AsRef<Path>>(path: P, grab: bool) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let mut device = Device::open(path)?;
        if !is_gamepad(&device) {
            warn!("{} does not report BTN_SOUTH, it may not be a gamepad", path.display());
        }
        if grab {
            device.grab()?;
            info!("Grabbed {} for exclusive access", path.display());
        }
        info!(
            "✓ Capturing '{}' ({})",
            device.name().unwrap_or("Unknown"),
            path.display()
        );
        Ok(Self { device })
    }

    /// Open a device chosen by path or by its index in [`list_gamepads`].
    pub fn select(choice: &str, grab: bool) -> Result<Self, SourceError> {
        if let Ok(index) = choice.parse::<usize>() {
            let pads = list_gamepads();
            let pad = pads.get(index).ok_or_else(|| {
                SourceError::NoGamepad(format!("index {} (found {})", index, pads.len()))
            })?;
            return Self::open(&pad.path, grab);
        }
        Self::open(choice, grab)
    }
}

impl RawEventSource for EvdevSource {
    fn poll(&mut self) -> Result<Vec<RawEvent>, SourceError> {
        let events = self.device.fetch_events()?;
        Ok(events.map(|event| to_raw_event(&event)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_mnemonics_become_codes() {
        let key = evdev::InputEvent::new(evdev::EventType::KEY.0, KeyCode::BTN_SOUTH.0, 1);
        assert_eq!(to_raw_event(&key), RawEvent::key("BTN_SOUTH", 1));

        let axis = evdev::InputEvent::new(
            evdev::EventType::ABSOLUTE.0,
            AbsoluteAxisCode::ABS_HAT0X.0,
            -1,
        );
        assert_eq!(to_raw_event(&axis), RawEvent::absolute("ABS_HAT0X", -1));

        let sync = evdev::InputEvent::new(evdev::EventType::SYNCHRONIZATION.0, 0, 0);
        assert_eq!(to_raw_event(&sync).event_type, EventType::Sync);
    }
}
