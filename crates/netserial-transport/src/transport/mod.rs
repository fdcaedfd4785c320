//! Transport contract and backends

pub mod tcp;

pub use tcp::{TcpSerialTransport, TcpTransportConfig};

use crate::buffer::SerialBuffer;
use crate::settings::PortSettings;
use async_trait::async_trait;
use netserial_core::error::Result;
use netserial_core::PinStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Description of a port a backend can reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescription {
    /// Port name, `host:port` for network bridges
    pub port_name: String,
    /// Human-readable description
    pub description: String,
}

impl PortDescription {
    /// Create a new port description
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
        }
    }
}

/// Contract shared by serial port backends
///
/// Mirrors what a native serial backend exposes, so callers can treat a
/// network bridge exactly like a local port: settings are applied before
/// opening, a shared ring buffer is attached for monitoring, and status
/// accessors reflect the attached buffer.
#[async_trait]
pub trait SerialTransport: Send + Sync {
    /// Apply a settings value
    ///
    /// When a configurator is attached to the settings, it is invoked
    /// here; its failure is returned but the local parameter cache is
    /// updated regardless.
    async fn apply_settings(&self, settings: &PortSettings) -> Result<()>;

    /// Establish the connection and start the I/O task
    async fn open(&self) -> Result<()>;

    /// Close the connection
    ///
    /// Returns once the I/O task has observed the shutdown, within a
    /// bounded wait, and the attached buffer has been purged.
    async fn close(&self) -> Result<()>;

    /// Close and release every resource held by the transport
    async fn shutdown(&self) -> Result<()>;

    /// Attach the shared buffer the I/O task fills and drains
    ///
    /// `label` tags every diagnostic the I/O task records.
    async fn start_monitor(&self, buffer: Arc<dyn SerialBuffer>, label: &str) -> Result<()>;

    /// Whether the connection is currently established
    fn is_open(&self) -> bool;

    /// Whether the I/O task is running
    fn is_running(&self) -> bool;

    /// Bytes waiting in the attached buffer's inbound side
    fn bytes_to_read(&self) -> usize;

    /// Bytes queued in the attached buffer's outbound side
    fn bytes_to_write(&self) -> usize;

    /// Snapshot of the modem control lines
    fn pin_status(&self) -> PinStatus;

    /// Backend driver version string
    fn driver_version(&self) -> String;

    /// Names of the ports this backend can reach
    fn port_names(&self) -> Vec<String>;

    /// Descriptions of the ports this backend can reach
    fn port_descriptions(&self) -> Vec<PortDescription>;

    /// Discard pending input held below the buffer
    fn discard_in_buffer(&self);

    /// Discard pending output held below the buffer
    fn discard_out_buffer(&self);

    /// Load low-level settings from the underlying driver
    fn get_port_settings(&self);

    /// Write low-level settings to the underlying driver
    fn set_port_settings(&self);
}
