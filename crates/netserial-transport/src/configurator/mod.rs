//! Remote device configuration strategies
//!
//! A bridge device carries two channels: the raw data socket the
//! transport speaks, and an out-of-band configuration interface used to
//! reprogram the serial side. Configurators encapsulate the vendor
//! protocol of that second channel.

pub mod waveshare;

pub use waveshare::{RetryPolicy, WaveshareConfigurator, WaveshareDefaults};

use crate::settings::TcpSerialSettings;
use async_trait::async_trait;
use netserial_core::error::Result;

/// Strategy for pushing serial parameters to a bridge device
///
/// Supplied at settings construction time, which keeps the transport
/// decoupled from any particular vendor protocol.
#[async_trait]
pub trait RemoteConfigurator: Send + Sync {
    /// Push the settings to the physical device and verify it comes back
    ///
    /// Returns once the device has accepted the configuration, rebooted,
    /// and answered a reachability probe.
    async fn push(&self, settings: &TcpSerialSettings) -> Result<()>;
}
