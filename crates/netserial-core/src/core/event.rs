//! Event system for transport state changes and notifications

use crate::data::{PinStatus, SerialData};
use tokio::sync::broadcast;

/// Transport event types
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Connection established to the given endpoint
    Connected(String),
    /// Connection closed
    Disconnected,
    /// Data arrived from the remote device
    DataReceived(SerialData),
    /// All buffered outbound data was handed to the socket
    TxEmpty,
    /// A fault was captured inside the I/O path
    ErrorReceived(String),
    /// A modem control line changed state
    PinChanged(PinStatus),
}

impl std::fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportEvent::Connected(endpoint) => write!(f, "Connected: {}", endpoint),
            TransportEvent::Disconnected => write!(f, "Disconnected"),
            TransportEvent::DataReceived(kind) => write!(f, "DataReceived: {}", kind),
            TransportEvent::TxEmpty => write!(f, "TxEmpty"),
            TransportEvent::ErrorReceived(message) => write!(f, "Error: {}", message),
            TransportEvent::PinChanged(pins) => write!(f, "PinChanged: {:?}", pins),
        }
    }
}

/// Event dispatcher for transport events
///
/// Uses a broadcast channel to distribute events to multiple subscribers.
pub struct EventDispatcher {
    tx: broadcast::Sender<TransportEvent>,
}

impl EventDispatcher {
    /// Create a new event dispatcher with the specified buffer size
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _rx) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: TransportEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_creation() {
        let dispatcher = EventDispatcher::new(10);
        assert_eq!(dispatcher.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let dispatcher = EventDispatcher::default();
        let delivered = dispatcher.publish(TransportEvent::Disconnected);
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_subscribe_and_receive() {
        let dispatcher = EventDispatcher::new(10);
        let mut rx = dispatcher.subscribe();

        dispatcher.publish(TransportEvent::Connected("10.0.0.7:8000".to_string()));

        match rx.recv().await {
            Ok(TransportEvent::Connected(endpoint)) => {
                assert_eq!(endpoint, "10.0.0.7:8000");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let dispatcher = EventDispatcher::new(10);
        let mut rx1 = dispatcher.subscribe();
        let mut rx2 = dispatcher.subscribe();

        let delivered = dispatcher.publish(TransportEvent::DataReceived(SerialData::Chars));
        assert_eq!(delivered, 2);

        assert!(matches!(
            rx1.recv().await,
            Ok(TransportEvent::DataReceived(SerialData::Chars))
        ));
        assert!(matches!(
            rx2.recv().await,
            Ok(TransportEvent::DataReceived(SerialData::Chars))
        ));
    }

    #[test]
    fn test_event_display() {
        let event = TransportEvent::DataReceived(SerialData::Eof);
        assert_eq!(event.to_string(), "DataReceived: Eof");
        assert_eq!(TransportEvent::TxEmpty.to_string(), "TxEmpty");
    }
}
