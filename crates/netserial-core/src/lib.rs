//! # NetSerial Core
//!
//! Core types, traits, and utilities for the NetSerial stack.
//!
//! This crate provides:
//! - Serial line data models (framing, flow control, pin status)
//! - The transport event system and listener traits
//! - The unified error taxonomy used across the workspace

pub mod core;
pub mod data;
pub mod error;

pub use crate::core::{
    event::{EventDispatcher, TransportEvent},
    listener::{TransportListener, TransportListenerHandle},
};
pub use data::{Handshake, Parity, PinStatus, SerialData, SerialSettings, StopBits};
pub use error::{ConfigError, ConnectionError, Error, Result, TransportError};
