//! TCP serial bridge transport
//!
//! Presents a TCP data socket to a bridge device as a local serial port.
//! One I/O task owns the socket for the lifetime of an open transport:
//! it fills the attached ring buffer with received bytes and drains the
//! buffer's outbound region whenever the producer side signals queued
//! data. Faults inside the task are logged under the transport's label
//! and never unwind past the task boundary.

use crate::buffer::SerialBuffer;
use crate::settings::{PortSettings, TcpSerialSettings};
use crate::transport::{PortDescription, SerialTransport};
use async_trait::async_trait;
use netserial_core::error::{ConnectionError, Result, TransportError};
use netserial_core::{
    EventDispatcher, PinStatus, SerialData, TransportEvent, TransportListener,
    TransportListenerHandle,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Poll interval while the inbound side of the buffer is full
const INBOUND_FULL_POLL: Duration = Duration::from_millis(10);

/// Tuning knobs for the TCP transport
#[derive(Debug, Clone)]
pub struct TcpTransportConfig {
    /// Connect timeout for the data socket
    pub connect_timeout: Duration,
    /// Reconnect attempts before the I/O task gives up
    pub reconnect_attempts: u32,
    /// Delay between reconnect attempts
    pub reconnect_delay: Duration,
    /// Poll interval while `close()` waits for the I/O task
    pub close_poll_interval: Duration,
    /// Upper bound on the `close()` wait
    pub close_timeout: Duration,
    /// Scratch size for one socket read
    pub read_chunk_size: usize,
}

impl Default for TcpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(5000),
            reconnect_attempts: 3,
            reconnect_delay: Duration::from_millis(250),
            close_poll_interval: Duration::from_millis(1),
            close_timeout: Duration::from_millis(1000),
            read_chunk_size: 4096,
        }
    }
}

/// Broadcast dispatcher plus registered listeners, shared with the I/O task
struct EventHub {
    dispatcher: EventDispatcher,
    listeners: RwLock<HashMap<String, Arc<dyn TransportListener>>>,
}

impl EventHub {
    fn new() -> Self {
        Self {
            dispatcher: EventDispatcher::default(),
            listeners: RwLock::new(HashMap::new()),
        }
    }

    fn publish(&self, event: TransportEvent) {
        self.dispatcher.publish(event.clone());
        let listeners: Vec<Arc<dyn TransportListener>> =
            self.listeners.read().values().cloned().collect();
        for listener in listeners {
            let event = event.clone();
            tokio::spawn(async move {
                deliver(listener, event).await;
            });
        }
    }
}

async fn deliver(listener: Arc<dyn TransportListener>, event: TransportEvent) {
    match event {
        TransportEvent::Connected(endpoint) => listener.on_connected(&endpoint).await,
        TransportEvent::Disconnected => listener.on_disconnected().await,
        TransportEvent::DataReceived(kind) => listener.on_data_received(kind).await,
        TransportEvent::TxEmpty => listener.on_tx_empty().await,
        TransportEvent::ErrorReceived(message) => listener.on_error(&message).await,
        TransportEvent::PinChanged(pins) => listener.on_pin_changed(pins).await,
    }
}

/// Buffer attachment handed to the running I/O task
struct MonitorHandoff {
    buffer: Arc<dyn SerialBuffer>,
    send_ready: mpsc::Receiver<()>,
    label: String,
}

enum ReconnectOutcome {
    Restored,
    Exhausted,
    ShutdownRequested,
}

/// Owns the socket and runs the receive/send loop
struct IoWorker {
    stream: TcpStream,
    endpoint: String,
    label: String,
    config: TcpTransportConfig,
    open_flag: Arc<AtomicBool>,
    hub: Arc<EventHub>,
    shutdown_rx: mpsc::Receiver<()>,
    monitor_rx: mpsc::Receiver<MonitorHandoff>,
}

impl IoWorker {
    async fn run(mut self) {
        debug!("{}: I/O task started", self.label);

        // Consumers attach after open; inbound bytes queue in the kernel
        // until the handoff arrives.
        let handoff = tokio::select! {
            _ = self.shutdown_rx.recv() => None,
            handoff = self.monitor_rx.recv() => handoff,
        };
        let (buffer, mut send_ready) = match handoff {
            Some(handoff) => {
                self.label = handoff.label;
                (handoff.buffer, handoff.send_ready)
            }
            None => {
                self.finish();
                return;
            }
        };

        debug!("{}: monitoring started", self.label);
        let mut scratch = vec![0u8; self.config.read_chunk_size];
        loop {
            let space = buffer.inbound_space().min(self.config.read_chunk_size);
            tokio::select! {
                // A dropped sender also lands here and stops the task.
                _ = self.shutdown_rx.recv() => {
                    break;
                }

                result = self.stream.read(&mut scratch[..space]), if space > 0 => {
                    match result {
                        Ok(0) => {
                            debug!("{}: peer closed the stream", self.label);
                            if !self.recover_receive_side().await {
                                break;
                            }
                        }
                        Ok(n) => {
                            let accepted = buffer.produce_inbound(&scratch[..n]);
                            if accepted < n {
                                warn!(
                                    "{}: inbound buffer rejected {} of {} bytes",
                                    self.label,
                                    n - accepted,
                                    n
                                );
                            }
                            self.hub
                                .publish(TransportEvent::DataReceived(SerialData::Chars));
                        }
                        Err(e) => {
                            self.record_fault(&ConnectionError::ConnectionLost {
                                reason: format!("receive from {}: {}", self.endpoint, e),
                            });
                            if !self.recover_receive_side().await {
                                break;
                            }
                        }
                    }
                }

                signal = send_ready.recv() => {
                    match signal {
                        Some(()) => {
                            if !self.drain_outbound(&buffer).await {
                                break;
                            }
                        }
                        None => {
                            warn!("{}: send-ready channel closed, stopping", self.label);
                            break;
                        }
                    }
                }

                // Inbound side is full; wait for the consumer to drain it.
                _ = tokio::time::sleep(INBOUND_FULL_POLL), if space == 0 => {}
            }
        }

        self.finish();
    }

    /// Drain the outbound region into the socket
    ///
    /// Returns `false` when the loop should stop. A failed send leaves
    /// the data queued; the next send-ready signal retries it.
    async fn drain_outbound(&mut self, buffer: &Arc<dyn SerialBuffer>) -> bool {
        let data = buffer.snapshot_outbound();
        if data.is_empty() {
            // Coalesced signal, nothing left to send.
            return true;
        }
        let mut reconnected = false;
        loop {
            match self.stream.write_all(&data).await {
                Ok(()) => {
                    buffer.consume_outbound(data.len());
                    buffer.signal_tx_empty();
                    self.hub.publish(TransportEvent::TxEmpty);
                    return true;
                }
                Err(e) => {
                    self.record_fault(&ConnectionError::ConnectionLost {
                        reason: format!("send to {}: {}", self.endpoint, e),
                    });
                    if reconnected {
                        return true;
                    }
                    match self.reconnect().await {
                        ReconnectOutcome::Restored => reconnected = true,
                        ReconnectOutcome::Exhausted | ReconnectOutcome::ShutdownRequested => {
                            return false;
                        }
                    }
                }
            }
        }
    }

    /// Handle a dropped link on the receive side
    ///
    /// Returns `false` when the loop should stop.
    async fn recover_receive_side(&mut self) -> bool {
        match self.reconnect().await {
            ReconnectOutcome::Restored => true,
            ReconnectOutcome::Exhausted => {
                self.hub
                    .publish(TransportEvent::DataReceived(SerialData::Eof));
                false
            }
            ReconnectOutcome::ShutdownRequested => false,
        }
    }

    /// Bounded reconnect shared by the receive and send paths
    async fn reconnect(&mut self) -> ReconnectOutcome {
        warn!(
            "{}: connection to {} lost, reconnecting",
            self.label, self.endpoint
        );
        for attempt in 1..=self.config.reconnect_attempts {
            // A pending shutdown outranks reconnection.
            if self.shutdown_requested() {
                return ReconnectOutcome::ShutdownRequested;
            }
            match tokio::time::timeout(
                self.config.connect_timeout,
                TcpStream::connect(self.endpoint.as_str()),
            )
            .await
            {
                Ok(Ok(stream)) => {
                    debug!(
                        "{}: reconnected to {} (attempt {}/{})",
                        self.label, self.endpoint, attempt, self.config.reconnect_attempts
                    );
                    self.stream = stream;
                    return ReconnectOutcome::Restored;
                }
                Ok(Err(e)) => {
                    warn!(
                        "{}: reconnect attempt {}/{} failed: {}",
                        self.label, attempt, self.config.reconnect_attempts, e
                    );
                }
                Err(_) => {
                    warn!(
                        "{}: reconnect attempt {}/{} timed out",
                        self.label, attempt, self.config.reconnect_attempts
                    );
                }
            }
            if attempt < self.config.reconnect_attempts {
                tokio::time::sleep(self.config.reconnect_delay).await;
            }
        }
        let err = ConnectionError::ReconnectExhausted {
            endpoint: self.endpoint.clone(),
            attempts: self.config.reconnect_attempts,
        };
        error!("{}: {}", self.label, err);
        self.hub.publish(TransportEvent::ErrorReceived(err.to_string()));
        ReconnectOutcome::Exhausted
    }

    fn shutdown_requested(&mut self) -> bool {
        match self.shutdown_rx.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }

    fn record_fault(&self, err: &ConnectionError) {
        error!("{}: {}", self.label, err);
        self.hub
            .publish(TransportEvent::ErrorReceived(err.to_string()));
    }

    fn finish(self) {
        drop(self.stream);
        self.open_flag.store(false, Ordering::SeqCst);
        self.hub.publish(TransportEvent::Disconnected);
        debug!("{}: I/O task stopped", self.label);
    }
}

/// TCP transport presenting a bridge device as a serial port
///
/// Created once per logical port. Settings are applied first, `open()`
/// connects and spawns the I/O task, `start_monitor()` attaches the
/// shared ring buffer, and `close()`/`shutdown()` tear the session down.
pub struct TcpSerialTransport {
    config: TcpTransportConfig,
    applied: RwLock<Option<TcpSerialSettings>>,
    monitor: RwLock<Option<Arc<dyn SerialBuffer>>>,
    open_flag: Arc<AtomicBool>,
    io_task: RwLock<Option<JoinHandle<()>>>,
    shutdown_tx: RwLock<Option<mpsc::Sender<()>>>,
    monitor_tx: RwLock<Option<mpsc::Sender<MonitorHandoff>>>,
    hub: Arc<EventHub>,
}

impl TcpSerialTransport {
    /// Create a transport with default tuning
    pub fn new() -> Self {
        Self::with_config(TcpTransportConfig::default())
    }

    /// Create a transport with explicit tuning
    pub fn with_config(config: TcpTransportConfig) -> Self {
        Self {
            config,
            applied: RwLock::new(None),
            monitor: RwLock::new(None),
            open_flag: Arc::new(AtomicBool::new(false)),
            io_task: RwLock::new(None),
            shutdown_tx: RwLock::new(None),
            monitor_tx: RwLock::new(None),
            hub: Arc::new(EventHub::new()),
        }
    }

    /// Subscribe to transport events
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.hub.dispatcher.subscribe()
    }

    /// Register a listener and return its handle
    pub fn add_listener(&self, listener: Arc<dyn TransportListener>) -> TransportListenerHandle {
        let handle = TransportListenerHandle(Uuid::new_v4().to_string());
        self.hub.listeners.write().insert(handle.0.clone(), listener);
        handle
    }

    /// Remove a previously registered listener
    pub fn remove_listener(&self, handle: &TransportListenerHandle) -> bool {
        self.hub.listeners.write().remove(&handle.0).is_some()
    }
}

impl Default for TcpSerialTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SerialTransport for TcpSerialTransport {
    async fn apply_settings(&self, settings: &PortSettings) -> Result<()> {
        let tcp = match settings {
            PortSettings::Tcp(tcp) => tcp.clone(),
            PortSettings::Serial(_) => {
                return Err(TransportError::UnsupportedSettings {
                    reason: "serial settings carry no remote endpoint".to_string(),
                }
                .into());
            }
        };

        // The cache is committed before the configurator runs; a push
        // failure reaches the caller but never rolls it back.
        *self.applied.write() = Some(tcp.clone());
        debug!("transport configured for {}", tcp.endpoint());

        if let Some(configurator) = tcp.configurator.clone() {
            configurator.push(&tcp).await?;
        }
        Ok(())
    }

    async fn open(&self) -> Result<()> {
        if self.is_open() {
            return Err(TransportError::AlreadyOpen.into());
        }
        let settings = self.applied.read().clone();
        let settings = settings.ok_or(TransportError::NotConfigured)?;
        let endpoint = settings.endpoint();

        debug!("connecting to {}", endpoint);
        let stream = match tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(endpoint.as_str()),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ConnectionError::ConnectFailed {
                    endpoint,
                    reason: e.to_string(),
                }
                .into());
            }
            Err(_) => {
                return Err(ConnectionError::ConnectTimeout {
                    endpoint,
                    timeout_ms: self.config.connect_timeout.as_millis() as u64,
                }
                .into());
            }
        };

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (monitor_tx, monitor_rx) = mpsc::channel::<MonitorHandoff>(1);
        self.open_flag.store(true, Ordering::SeqCst);

        let worker = IoWorker {
            stream,
            endpoint: endpoint.clone(),
            label: endpoint.clone(),
            config: self.config.clone(),
            open_flag: self.open_flag.clone(),
            hub: self.hub.clone(),
            shutdown_rx,
            monitor_rx,
        };
        *self.io_task.write() = Some(tokio::spawn(worker.run()));
        *self.shutdown_tx.write() = Some(shutdown_tx);
        *self.monitor_tx.write() = Some(monitor_tx);

        self.hub.publish(TransportEvent::Connected(endpoint.clone()));
        debug!("connected to {}", endpoint);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let shutdown_tx = self.shutdown_tx.write().take();
        if let Some(tx) = shutdown_tx {
            // The task may already have exited on its own.
            let _ = tx.send(()).await;
        }
        self.monitor_tx.write().take();

        let deadline = Instant::now() + self.config.close_timeout;
        while self.open_flag.load(Ordering::SeqCst) && Instant::now() < deadline {
            tokio::time::sleep(self.config.close_poll_interval).await;
        }
        if self.open_flag.load(Ordering::SeqCst) {
            warn!(
                "close: I/O task still running after {:?}",
                self.config.close_timeout
            );
        }

        let buffer = self.monitor.write().take();
        if let Some(buffer) = buffer {
            buffer.purge();
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.close().await?;
        let task = self.io_task.write().take();
        if let Some(task) = task {
            task.await.map_err(|e| TransportError::Other {
                message: format!("I/O task join failed: {}", e),
            })?;
        }
        Ok(())
    }

    async fn start_monitor(&self, buffer: Arc<dyn SerialBuffer>, label: &str) -> Result<()> {
        if !self.is_open() {
            return Err(TransportError::NotOpen.into());
        }
        if self.monitor.read().is_some() {
            return Err(TransportError::AlreadyMonitored.into());
        }

        let (ready_tx, ready_rx) = mpsc::channel::<()>(32);
        let handoff = MonitorHandoff {
            buffer: buffer.clone(),
            send_ready: ready_rx,
            label: label.to_string(),
        };

        let monitor_tx = self.monitor_tx.read().clone();
        let tx = monitor_tx.ok_or(TransportError::NotOpen)?;
        tx.send(handoff).await.map_err(|_| TransportError::NotOpen)?;

        // The notifier goes live only once the I/O task holds the handoff;
        // a failed attach leaves the caller's buffer untouched.
        buffer.set_send_ready_notifier(ready_tx);
        *self.monitor.write() = Some(buffer);
        debug!("{}: monitor attached", label);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open_flag.load(Ordering::SeqCst)
    }

    fn is_running(&self) -> bool {
        self.io_task
            .read()
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    fn bytes_to_read(&self) -> usize {
        self.monitor
            .read()
            .as_ref()
            .map(|buffer| buffer.inbound_len())
            .unwrap_or(0)
    }

    fn bytes_to_write(&self) -> usize {
        self.monitor
            .read()
            .as_ref()
            .map(|buffer| buffer.outbound_len())
            .unwrap_or(0)
    }

    fn pin_status(&self) -> PinStatus {
        // A TCP link has no modem control lines.
        PinStatus::default()
    }

    fn driver_version(&self) -> String {
        "N/A".to_string()
    }

    fn port_names(&self) -> Vec<String> {
        self.applied
            .read()
            .as_ref()
            .map(|settings| vec![settings.endpoint()])
            .unwrap_or_default()
    }

    fn port_descriptions(&self) -> Vec<PortDescription> {
        self.applied
            .read()
            .as_ref()
            .map(|settings| vec![PortDescription::new(settings.endpoint(), "N/A")])
            .unwrap_or_default()
    }

    // The data socket carries no control plane; nothing to discard or tune.
    fn discard_in_buffer(&self) {}

    fn discard_out_buffer(&self) {}

    fn get_port_settings(&self) {}

    fn set_port_settings(&self) {}
}
