//! Error handling for NetSerial
//!
//! This module provides comprehensive error types for all layers of the
//! stack:
//! - Transport errors (lifecycle and precondition violations)
//! - Connection errors (socket connect, reconnect, timeouts)
//! - Configuration errors (remote device provisioning)
//!
//! All error types use `thiserror` for ergonomic error handling and
//! conversion.

use thiserror::Error;

/// Transport lifecycle errors
///
/// Raised by transport implementations when an operation is invoked in a
/// state that cannot honor it, or when the caller hands the transport
/// something it cannot interpret.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// An address string could not be split into a host and a port
    #[error("Malformed address '{address}': expected host:port")]
    MalformedAddress {
        /// The address string as supplied by the caller
        address: String,
    },

    /// The applied settings are not usable by this transport
    #[error("Unsupported settings: {reason}")]
    UnsupportedSettings {
        /// Why the settings were rejected
        reason: String,
    },

    /// Open was called while the transport is already open
    #[error("Transport is already open")]
    AlreadyOpen,

    /// An operation that requires an open transport found it closed
    #[error("Transport is not open")]
    NotOpen,

    /// An operation was invoked before any settings were applied
    #[error("Transport is not configured")]
    NotConfigured,

    /// Monitoring was requested twice for the same session
    #[error("Transport is already monitored")]
    AlreadyMonitored,

    /// Generic transport error
    #[error("Transport error: {message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Connection errors
///
/// Raised when the underlying socket cannot be established or is lost
/// while the transport is running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// Failed to establish connection
    #[error("Failed to connect to {endpoint}: {reason}")]
    ConnectFailed {
        /// Endpoint that was being connected to
        endpoint: String,
        /// Reason for the failure
        reason: String,
    },

    /// Connection attempt timed out
    #[error("Connection to {endpoint} timed out after {timeout_ms}ms")]
    ConnectTimeout {
        /// Endpoint that was being connected to
        endpoint: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Connection lost unexpectedly
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// Reason for the loss
        reason: String,
    },

    /// Reconnect attempts were exhausted without restoring the link
    #[error("Reconnect to {endpoint} failed after {attempts} attempts")]
    ReconnectExhausted {
        /// Endpoint that was being reconnected to
        endpoint: String,
        /// Number of attempts made
        attempts: u32,
    },
}

/// Remote configuration errors
///
/// Raised by remote configurators when a provisioning conversation with
/// the device cannot be completed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A provisioning request kept failing after all retries
    #[error("Configuration step '{step}' failed after {attempts} attempts")]
    StepFailed {
        /// Name of the request that failed
        step: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// Generic configuration error
    #[error("Configuration error: {message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Main error type for the NetSerial stack
///
/// This enum wraps all specific error types and provides a unified
/// error handling interface.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-related errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Connection-related errors
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Remote configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO errors from the standard library
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with a message
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error with a message
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::ConnectTimeout { .. })
        )
    }

    /// Check if this is a transport error
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
