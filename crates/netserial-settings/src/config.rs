//! Device profile configuration for NetSerial
//!
//! Provides configuration file handling for bridge device profiles.
//! Supports JSON and TOML file formats stored in platform-specific
//! directories.

use netserial_core::SerialSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SettingsError};

fn default_sync() -> bool {
    true
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

/// A saved bridge device profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Display name, unique within a config
    pub name: String,
    /// Bridge address as host:port, scheme optional
    pub address: String,
    /// UART packet time in milliseconds (0 keeps the device default)
    #[serde(default)]
    pub uart_packet_time: u32,
    /// UART packet length in bytes (0 keeps the device default)
    #[serde(default)]
    pub uart_packet_length: u32,
    /// Push the serial block to the device whenever settings change
    #[serde(default = "default_sync")]
    pub sync_baud_rate: bool,
    /// HTTP username for the device configuration pages
    #[serde(default = "default_username")]
    pub username: String,
    /// HTTP password for the device configuration pages
    #[serde(default = "default_password")]
    pub password: String,
    /// Serial line parameters pushed to the device
    #[serde(default)]
    pub serial: SerialSettings,
}

impl DeviceProfile {
    /// Create a profile with factory-default serial settings
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            uart_packet_time: 0,
            uart_packet_length: 0,
            sync_baud_rate: true,
            username: default_username(),
            password: default_password(),
            serial: SerialSettings::default(),
        }
    }

    /// Validate this profile
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SettingsError::InvalidProfile {
                name: self.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }

        // Structural check only; full parsing happens when the address
        // is turned into transport settings.
        let trimmed = self.address.trim().trim_end_matches('/');
        let without_scheme = match trimmed.find("://") {
            Some(idx) => &trimmed[idx + 3..],
            None => trimmed,
        };
        let valid = without_scheme
            .split_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid {
            return Err(SettingsError::InvalidProfile {
                name: self.name.clone(),
                reason: format!("address '{}' is not host:port", self.address),
            });
        }

        if self.serial.baud_rate == 0 {
            return Err(SettingsError::InvalidProfile {
                name: self.name.clone(),
                reason: "baud rate must be > 0".to_string(),
            });
        }

        if !(5..=8).contains(&self.serial.data_bits) {
            return Err(SettingsError::InvalidProfile {
                name: self.name.clone(),
                reason: format!("data bits must be 5-8, got {}", self.serial.data_bits),
            });
        }

        Ok(())
    }
}

/// Complete NetSerial configuration
///
/// Aggregates saved device profiles and provides file I/O operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Name of the profile selected at startup
    #[serde(default)]
    pub active_profile: Option<String>,
    /// Saved device profiles
    #[serde(default)]
    pub profiles: Vec<DeviceProfile>,
}

impl Config {
    /// Create new config with no profiles
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform-specific default config file location
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDirectory)?;
        Ok(base.join("netserial").join("config.json"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat {
                extension: extension_of(path),
            });
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::UnsupportedFormat {
                extension: extension_of(path),
            });
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (i, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(SettingsError::InvalidProfile {
                    name: profile.name.clone(),
                    reason: "duplicate profile name".to_string(),
                });
            }
        }

        if let Some(active) = &self.active_profile {
            if self.profile(active).is_none() {
                return Err(SettingsError::UnknownProfile(active.clone()));
            }
        }

        Ok(())
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Option<&DeviceProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// The profile selected at startup, if any
    pub fn active(&self) -> Option<&DeviceProfile> {
        self.active_profile
            .as_deref()
            .and_then(|name| self.profile(name))
    }

    /// Insert a profile, replacing any existing one with the same name
    pub fn upsert_profile(&mut self, profile: DeviceProfile) {
        match self.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(slot) => *slot = profile,
            None => self.profiles.push(profile),
        }
    }

    /// Remove a profile by name; clears the active marker if it matched
    pub fn remove_profile(&mut self, name: &str) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.name != name);
        if self.active_profile.as_deref() == Some(name) {
            self.active_profile = None;
        }
        self.profiles.len() != before
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> Config {
        let mut profile = DeviceProfile::new("workshop", "192.168.1.50:8000");
        profile.serial = SerialSettings::with_baud_rate(250000);
        profile.uart_packet_time = 10;
        profile.uart_packet_length = 64;
        let mut config = Config::new();
        config.upsert_profile(profile);
        config.active_profile = Some("workshop".to_string());
        config
    }

    #[test]
    fn test_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        sample_config().save_to_file(&path).unwrap();
        let loaded = Config::load_from_file(&path).unwrap();

        assert_eq!(loaded.profiles.len(), 1);
        let profile = loaded.active().unwrap();
        assert_eq!(profile.name, "workshop");
        assert_eq!(profile.address, "192.168.1.50:8000");
        assert_eq!(profile.serial.baud_rate, 250000);
        assert_eq!(profile.uart_packet_time, 10);
        assert_eq!(profile.uart_packet_length, 64);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        sample_config().save_to_file(&path).unwrap();
        let loaded = Config::load_from_file(&path).unwrap();

        assert_eq!(loaded.profiles.len(), 1);
        assert_eq!(loaded.active_profile.as_deref(), Some("workshop"));
        assert_eq!(loaded.profiles[0].serial.baud_rate, 250000);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let err = sample_config().save_to_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.json");

        sample_config().save_to_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut config = Config::new();
        config.upsert_profile(DeviceProfile::new("", "10.0.0.2:23"));
        assert!(matches!(
            config.validate().unwrap_err(),
            SettingsError::InvalidProfile { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let mut config = Config::new();
        config.upsert_profile(DeviceProfile::new("bare", "justahost"));
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.upsert_profile(DeviceProfile::new("range", "host:70000"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_scheme_and_trailing_slash() {
        let mut config = Config::new();
        config.upsert_profile(DeviceProfile::new("schemed", "tcp://10.0.0.2:8000/"));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut config = Config::new();
        config.profiles.push(DeviceProfile::new("dup", "10.0.0.2:23"));
        config.profiles.push(DeviceProfile::new("dup", "10.0.0.3:23"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_validate_rejects_dangling_active_profile() {
        let mut config = sample_config();
        config.active_profile = Some("missing".to_string());
        assert!(matches!(
            config.validate().unwrap_err(),
            SettingsError::UnknownProfile(_)
        ));
    }

    #[test]
    fn test_upsert_replaces_by_name() {
        let mut config = sample_config();
        let mut replacement = DeviceProfile::new("workshop", "10.1.1.1:9100");
        replacement.serial = SerialSettings::with_baud_rate(9600);
        config.upsert_profile(replacement);

        assert_eq!(config.profiles.len(), 1);
        assert_eq!(config.profiles[0].address, "10.1.1.1:9100");
        assert_eq!(config.profiles[0].serial.baud_rate, 9600);
    }

    #[test]
    fn test_remove_profile_clears_active() {
        let mut config = sample_config();
        assert!(config.remove_profile("workshop"));
        assert!(config.active_profile.is_none());
        assert!(config.profiles.is_empty());
        assert!(!config.remove_profile("workshop"));
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        // Config files written before the credential fields existed.
        let json = r#"{
            "profiles": [
                {"name": "old", "address": "10.0.0.2:23"}
            ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        let profile = &config.profiles[0];
        assert_eq!(profile.username, "admin");
        assert_eq!(profile.password, "admin");
        assert!(profile.sync_baud_rate);
        assert_eq!(profile.uart_packet_time, 0);
        assert_eq!(profile.serial.baud_rate, 115200);
        config.validate().unwrap();
    }
}
