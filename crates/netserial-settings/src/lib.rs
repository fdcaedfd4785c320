//! NetSerial Settings Crate
//!
//! Handles saved device profiles and configuration persistence.

pub mod config;
pub mod error;

pub use config::{Config, DeviceProfile};
pub use error::{Result, SettingsError};
