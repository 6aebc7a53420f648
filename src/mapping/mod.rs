//! Mapping module - converts raw pad reports to virtual controller actions

pub mod buttons;
pub mod converter;

pub use buttons::ButtonMap;
pub use converter::{AxisState, Converter};
