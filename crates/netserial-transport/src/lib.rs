//! # NetSerial Transport
//!
//! TCP serial bridge transport: presents the raw data socket of a
//! TCP-to-serial bridge device as a local serial port, and pushes serial
//! parameters to the device over its out-of-band HTTP configuration
//! channel.
//!
//! The transport consumes a caller-owned ring buffer through the
//! [`SerialBuffer`] contract and reports state through broadcast events
//! and registered listeners.

pub mod buffer;
pub mod configurator;
pub mod settings;
pub mod transport;

pub use buffer::SerialBuffer;
pub use configurator::{RemoteConfigurator, RetryPolicy, WaveshareConfigurator, WaveshareDefaults};
pub use settings::{PortSettings, TcpSerialSettings};
pub use transport::{PortDescription, SerialTransport, TcpSerialTransport, TcpTransportConfig};
