//! Ring-buffer contract consumed by transport backends
//!
//! The transport never buffers bytes itself. It fills and drains a
//! caller-owned ring buffer through this trait, and the producer side
//! signals queued outbound data over an explicit channel instead of a
//! reentrant callback.

use tokio::sync::mpsc;

/// Byte buffer shared between a transport and its consumer
///
/// Implementations provide their own internal synchronization. Each
/// direction is single-producer/single-consumer: the transport is the
/// only writer of the inbound region and the only reader of the
/// outbound region.
pub trait SerialBuffer: Send + Sync {
    /// Number of inbound bytes waiting to be read by the consumer
    fn inbound_len(&self) -> usize;

    /// Remaining writable capacity on the inbound side
    fn inbound_space(&self) -> usize;

    /// Append received bytes to the inbound region
    ///
    /// Advances the inbound write cursor and returns the number of bytes
    /// accepted, which may be less than `data.len()` when the region
    /// fills up.
    fn produce_inbound(&self, data: &[u8]) -> usize;

    /// Number of outbound bytes queued for transmission
    fn outbound_len(&self) -> usize;

    /// Copy the readable outbound region into a contiguous buffer
    ///
    /// Does not advance the read cursor; the transport calls
    /// [`consume_outbound`](Self::consume_outbound) once the bytes are on
    /// the wire.
    fn snapshot_outbound(&self) -> Vec<u8>;

    /// Advance the outbound read cursor after a successful send
    fn consume_outbound(&self, count: usize);

    /// Discard all pending data in both directions
    fn purge(&self);

    /// Install the channel the producer side uses to signal queued data
    ///
    /// The producer sends one unit per enqueue; signals are coalescable,
    /// so a full channel means a wakeup is already pending and the send
    /// may be dropped.
    fn set_send_ready_notifier(&self, notifier: mpsc::Sender<()>);

    /// Called by the transport once the outbound region has drained
    fn signal_tx_empty(&self);
}
