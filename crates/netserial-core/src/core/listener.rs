//! Listener trait for transport events

use crate::data::{PinStatus, SerialData};
use async_trait::async_trait;

/// Handle for a registered transport listener
///
/// Returned when a listener is added and used to remove it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportListenerHandle(pub String);

/// Listener trait for transport events
///
/// Implement this trait to receive notifications about connection state,
/// incoming data, and faults. All methods have default empty
/// implementations, so implementors only need to override the events
/// they care about.
#[async_trait]
pub trait TransportListener: Send + Sync {
    /// Called when the connection to the remote endpoint is established
    async fn on_connected(&self, _endpoint: &str) {}

    /// Called when the connection is closed
    async fn on_disconnected(&self) {}

    /// Called when data arrives from the remote device
    async fn on_data_received(&self, _kind: SerialData) {}

    /// Called when all buffered outbound data was handed to the socket
    async fn on_tx_empty(&self) {}

    /// Called when a fault is captured inside the I/O path
    async fn on_error(&self, _message: &str) {}

    /// Called when a modem control line changes state
    async fn on_pin_changed(&self, _pins: PinStatus) {}
}
