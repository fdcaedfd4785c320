//! Serial line data models
//!
//! Defines the parameter set carried by every transport backend: framing
//! options, flow control disciplines, modem pin snapshots, and the tag
//! attached to data-received notifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Parity discipline applied to each character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    /// No parity bit
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
    /// Parity bit always set
    Mark,
    /// Parity bit always clear
    Space,
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::None => write!(f, "None"),
            Parity::Odd => write!(f, "Odd"),
            Parity::Even => write!(f, "Even"),
            Parity::Mark => write!(f, "Mark"),
            Parity::Space => write!(f, "Space"),
        }
    }
}

/// Stop bit count appended to each character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBits {
    /// One stop bit
    One,
    /// One and a half stop bits
    OnePointFive,
    /// Two stop bits
    Two,
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopBits::One => write!(f, "One"),
            StopBits::OnePointFive => write!(f, "OnePointFive"),
            StopBits::Two => write!(f, "Two"),
        }
    }
}

/// Flow control discipline for the serial line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handshake {
    /// No flow control
    None,
    /// Software flow control using XON/XOFF characters
    XOnXOff,
    /// Hardware flow control using RTS/CTS
    RequestToSend,
    /// Hardware and software flow control combined
    RequestToSendXOnXOff,
}

impl fmt::Display for Handshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handshake::None => write!(f, "None"),
            Handshake::XOnXOff => write!(f, "XOnXOff"),
            Handshake::RequestToSend => write!(f, "RequestToSend"),
            Handshake::RequestToSendXOnXOff => write!(f, "RequestToSendXOnXOff"),
        }
    }
}

/// Serial line parameters shared by every transport backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Number of data bits per character (5 to 8)
    pub data_bits: u8,
    /// Parity discipline
    pub parity: Parity,
    /// Stop bit count
    pub stop_bits: StopBits,
    /// Flow control discipline
    pub handshake: Handshake,
}

impl SerialSettings {
    /// Create settings with an explicit baud rate and 8N1 framing
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            handshake: Handshake::None,
        }
    }
}

/// Classification tag carried by a data-received notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialData {
    /// Character data is available in the receive buffer
    Chars,
    /// The peer closed the stream
    Eof,
}

impl fmt::Display for SerialData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialData::Chars => write!(f, "Chars"),
            SerialData::Eof => write!(f, "Eof"),
        }
    }
}

/// Snapshot of the modem control lines
///
/// Network transports have no physical pins, so every line reads
/// inactive for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PinStatus {
    /// Carrier detect
    pub cd_holding: bool,
    /// Clear to send
    pub cts_holding: bool,
    /// Data set ready
    pub dsr_holding: bool,
    /// Ring indicator
    pub ring_holding: bool,
}
