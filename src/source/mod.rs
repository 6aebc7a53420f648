//! Raw event sources
//!
//! A source wraps one physical controller and hands out its reports in the
//! order the device produced them.

pub mod scripted;
#[cfg(target_os = "linux")]
pub mod evdev_source;

pub use scripted::ScriptedSource;
#[cfg(target_os = "linux")]
pub use evdev_source::{list_gamepads, EvdevSource, GamepadInfo};

use crate::event::RawEvent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Input device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("No gamepad found: {0}")]
    NoGamepad(String),

    /// The source has nothing more to report; capture ends cleanly.
    #[error("Event source exhausted")]
    Exhausted,

    #[error("Platform not supported")]
    PlatformNotSupported,
}

/// Blocking access to one physical controller.
pub trait RawEventSource {
    /// Block until the device reports, then return every event since the
    /// last poll. An empty batch is not an error.
    fn poll(&mut self) -> Result<Vec<RawEvent>, SourceError>;
}

impl<T: RawEventSource + ?Sized> RawEventSource for Box<T> {
    fn poll(&mut self) -> Result<Vec<RawEvent>, SourceError> {
        (**self).poll()
    }
}
