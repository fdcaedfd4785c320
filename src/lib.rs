//! # NetSerial
//!
//! A Rust transport library for TCP-to-serial bridge devices:
//! - Serial-over-TCP data path with transparent reconnect
//! - Remote configuration of Waveshare-style converters over HTTP
//! - Saved device profiles with JSON/TOML persistence
//!
//! ## Architecture
//!
//! NetSerial is organized as a workspace with multiple crates:
//!
//! 1. **netserial-core** - Core types, events, and error taxonomy
//! 2. **netserial-transport** - TCP bridge transport and device configurator
//! 3. **netserial-settings** - Device profiles and configuration files
//! 4. **netserial** - Facade crate that re-exports the public API

pub use netserial_core::{
    ConfigError, ConnectionError, Error, EventDispatcher, Handshake, Parity, PinStatus, Result,
    SerialData, SerialSettings, StopBits, TransportError, TransportEvent, TransportListener,
    TransportListenerHandle,
};

pub use netserial_transport::{
    PortDescription, PortSettings, RemoteConfigurator, RetryPolicy, SerialBuffer, SerialTransport,
    TcpSerialSettings, TcpSerialTransport, TcpTransportConfig, WaveshareConfigurator,
    WaveshareDefaults,
};

pub use netserial_settings::{Config, DeviceProfile, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
