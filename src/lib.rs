//! remote-gamer: play on one machine with a gamepad plugged into another
//!
//! This library captures a physical controller's events on one host, carries
//! them over TCP, and replays them on a virtual Xbox-style pad on another.

pub mod backend;
pub mod capture;
pub mod config;
pub mod event;
pub mod manager;
pub mod mapping;
pub mod source;
pub mod station;
pub mod transport;

// Re-export commonly used items
pub use backend::{ControllerSink, MockControllerSink, SinkError};
pub use capture::Capture;
pub use config::Config;
pub use event::{EventType, RawEvent, Side, VirtualAction, VirtualButton};
pub use manager::{RelayError, RelayManager, Role};
pub use mapping::{ButtonMap, Converter};
pub use source::{RawEventSource, ScriptedSource, SourceError};
pub use station::Station;
pub use transport::{Link, Listener, TransportError};
