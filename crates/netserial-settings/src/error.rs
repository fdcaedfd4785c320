//! Error types for the settings crate.
//!
//! This module provides structured error types for configuration loading,
//! saving, and profile validation.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file format is not supported.
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// A device profile failed validation.
    #[error("Invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    /// The active profile name does not match any saved profile.
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    /// The configuration directory could not be resolved.
    #[error("No configuration directory available")]
    NoConfigDirectory,

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

/// Result type alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::UnsupportedFormat {
            extension: "yaml".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported config format: yaml");

        let err = SettingsError::InvalidProfile {
            name: "workshop".to_string(),
            reason: "name must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid profile 'workshop': name must not be empty"
        );

        let err = SettingsError::UnknownProfile("garage".to_string());
        assert_eq!(err.to_string(), "Unknown profile: garage");

        let err = SettingsError::NoConfigDirectory;
        assert_eq!(err.to_string(), "No configuration directory available");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::Io(_)));

        let json_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let settings_err: SettingsError = json_err.into();
        assert!(matches!(settings_err, SettingsError::Json(_)));

        let toml_err = toml::from_str::<toml::Table>("=").unwrap_err();
        let settings_err: SettingsError = toml_err.into();
        assert!(matches!(settings_err, SettingsError::TomlParse(_)));
    }
}
