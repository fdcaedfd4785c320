//! Settings model for serial port transports
//!
//! One flat configuration value per transport kind, selected by an
//! explicit variant tag. The TCP variant extends the common serial
//! parameters with the bridge endpoint, the vendor packet-framing knobs,
//! and an optional remote configurator.

use crate::configurator::RemoteConfigurator;
use netserial_core::error::{Result, TransportError};
use netserial_core::SerialSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Settings for a TCP serial bridge endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct TcpSerialSettings {
    /// Serial line parameters applied to the bridge's UART side
    pub serial: SerialSettings,
    /// Host name or IP address of the bridge device
    pub remote_host: String,
    /// TCP port of the bridge's data socket
    pub remote_port: u16,
    /// UART packet aggregation time in milliseconds (0 disables)
    pub uart_packet_time: u32,
    /// UART packet aggregation length in bytes (0 disables)
    pub uart_packet_length: u32,
    /// Let the bridge adapt its serial baud rate automatically
    pub sync_baud_rate: bool,
    /// Configurator used to push these settings to the device itself
    #[serde(skip)]
    pub configurator: Option<Arc<dyn RemoteConfigurator>>,
}

impl TcpSerialSettings {
    /// Derive settings from a connection address
    ///
    /// Accepts `host:port` with an optional scheme prefix and an
    /// optional trailing separator, e.g. `tcp://BRIDGE.local:8000/`.
    /// Serial parameters and vendor knobs start at their defaults.
    pub fn from_address(address: &str) -> Result<Self> {
        let mut settings = Self::default();
        settings.set_address(address)?;
        Ok(settings)
    }

    /// Derive settings from generic serial parameters plus an address
    ///
    /// The five serial fields are copied verbatim; the vendor knobs keep
    /// their defaults until set explicitly.
    pub fn from_serial(serial: &SerialSettings, address: &str) -> Result<Self> {
        let mut settings = Self::from_address(address)?;
        settings.serial = *serial;
        Ok(settings)
    }

    /// Re-derive host and port from a new connection address
    pub fn set_address(&mut self, address: &str) -> Result<()> {
        let (host, port) = parse_address(address)?;
        self.remote_host = host;
        self.remote_port = port;
        Ok(())
    }

    /// Attach a remote configurator
    pub fn with_configurator(mut self, configurator: Arc<dyn RemoteConfigurator>) -> Self {
        self.configurator = Some(configurator);
        self
    }

    /// Set the UART packet aggregation hints
    pub fn with_packet_framing(mut self, time_ms: u32, length: u32) -> Self {
        self.uart_packet_time = time_ms;
        self.uart_packet_length = length;
        self
    }

    /// Canonical port name, rendered with the scheme prefix
    pub fn port_name(&self) -> String {
        format!("tcp://{}:{}", self.remote_host, self.remote_port)
    }

    /// Endpoint in the `host:port` form used for the data socket
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.remote_host, self.remote_port)
    }
}

impl Default for TcpSerialSettings {
    fn default() -> Self {
        Self {
            serial: SerialSettings::default(),
            remote_host: String::new(),
            remote_port: 0,
            uart_packet_time: 0,
            uart_packet_length: 0,
            sync_baud_rate: true,
            configurator: None,
        }
    }
}

impl fmt::Debug for TcpSerialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpSerialSettings")
            .field("serial", &self.serial)
            .field("remote_host", &self.remote_host)
            .field("remote_port", &self.remote_port)
            .field("uart_packet_time", &self.uart_packet_time)
            .field("uart_packet_length", &self.uart_packet_length)
            .field("sync_baud_rate", &self.sync_baud_rate)
            .field("configurator", &self.configurator.is_some())
            .finish()
    }
}

/// Settings for one serial port, tagged by transport kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortSettings {
    /// A native serial port carrying only the common line parameters
    Serial(SerialSettings),
    /// A TCP serial bridge endpoint
    Tcp(TcpSerialSettings),
}

impl PortSettings {
    /// The common serial parameters of either variant
    pub fn serial(&self) -> &SerialSettings {
        match self {
            PortSettings::Serial(serial) => serial,
            PortSettings::Tcp(tcp) => &tcp.serial,
        }
    }
}

/// Split a connection address into host and port
///
/// Normalizes case, tolerates one trailing `/`, and strips any
/// `scheme://` prefix before splitting on the first colon.
fn parse_address(address: &str) -> Result<(String, u16)> {
    let mut addr = address.trim().to_lowercase();
    if addr.ends_with('/') {
        addr.pop();
    }
    if let Some(idx) = addr.find("://") {
        addr = addr[idx + 3..].to_string();
    }
    let (host, port) = addr.split_once(':').ok_or_else(|| {
        TransportError::MalformedAddress {
            address: address.to_string(),
        }
    })?;
    if host.is_empty() {
        return Err(TransportError::MalformedAddress {
            address: address.to_string(),
        }
        .into());
    }
    let port: u16 = port.parse().map_err(|_| TransportError::MalformedAddress {
        address: address.to_string(),
    })?;
    Ok((host.to_string(), port))
}
