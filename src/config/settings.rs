//! Persistent application settings with XDG Base Directory compliance.
//!
//! Settings are addressed by a closed set of keys and stored as a JSON
//! document in the user's config directory. Every key always resolves to a
//! value: keys missing from the file fall back to their defaults.

use std::{
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    directories::{BaseDirs, UserDirs},
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::{debug, info},
};

/// Raw time unit is the millisecond.
pub const SECOND: i64 = 1000;
/// One minute in raw time units.
pub const MINUTE: i64 = 60 * SECOND;
/// One hour in raw time units.
pub const HOUR: i64 = 60 * MINUTE;
/// One kilobyte in raw size units (bytes).
pub const KB: i64 = 1024;

/// Highest value accepted for the port settings.
pub const MAX_PORT: i64 = 65535;

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Identifies a single persisted setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Name other devices see during discovery.
    DeviceName,
    /// Interval between update checks (0 disables checking).
    UpdateInterval,
    /// Size of the transfer buffer in bytes.
    TransferBuffer,
    /// Directory received files are written to.
    TransferDirectory,
    /// TCP port used for transfers.
    TransferPort,
    /// UDP port used for discovery broadcasts.
    BroadcastPort,
    /// Time after which a silent peer is dropped.
    BroadcastTimeout,
    /// Time between discovery broadcasts.
    BroadcastInterval,
}

/// The kind of value a [`SettingKey`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
}

impl SettingKey {
    /// All keys, in display order.
    pub const ALL: [SettingKey; 8] = [
        SettingKey::DeviceName,
        SettingKey::UpdateInterval,
        SettingKey::TransferBuffer,
        SettingKey::TransferDirectory,
        SettingKey::TransferPort,
        SettingKey::BroadcastPort,
        SettingKey::BroadcastTimeout,
        SettingKey::BroadcastInterval,
    ];

    /// Returns the key's stable name, matching its JSON field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::DeviceName => "device_name",
            SettingKey::UpdateInterval => "update_interval",
            SettingKey::TransferBuffer => "transfer_buffer",
            SettingKey::TransferDirectory => "transfer_directory",
            SettingKey::TransferPort => "transfer_port",
            SettingKey::BroadcastPort => "broadcast_port",
            SettingKey::BroadcastTimeout => "broadcast_timeout",
            SettingKey::BroadcastInterval => "broadcast_interval",
        }
    }

    /// Returns the kind of value stored under this key.
    #[must_use]
    pub fn kind(self) -> ValueKind {
        match self {
            SettingKey::DeviceName | SettingKey::TransferDirectory => ValueKind::Text,
            _ => ValueKind::Integer,
        }
    }

    fn is_port(self) -> bool {
        matches!(self, SettingKey::TransferPort | SettingKey::BroadcastPort)
    }
}

/// A single setting value in raw stored units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Text(String),
    Integer(i64),
}

impl SettingValue {
    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(text) => Some(text),
            SettingValue::Integer(_) => None,
        }
    }

    /// Returns the integer content, if this is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(value) => Some(*value),
            SettingValue::Text(_) => None,
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Text(_) => ValueKind::Text,
            SettingValue::Integer(_) => ValueKind::Integer,
        }
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Integer(value)
    }
}

/// Serializable user settings in raw stored units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Name other devices see during discovery.
    pub device_name: String,
    /// Milliseconds between update checks (0 = disabled).
    pub update_interval: i64,
    /// Transfer buffer size in bytes.
    pub transfer_buffer: i64,
    /// Directory received files are written to.
    pub transfer_directory: String,
    /// TCP port for transfers.
    pub transfer_port: i64,
    /// UDP port for discovery broadcasts.
    pub broadcast_port: i64,
    /// Milliseconds of silence before a peer is dropped.
    pub broadcast_timeout: i64,
    /// Milliseconds between discovery broadcasts.
    pub broadcast_interval: i64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            update_interval: 24 * HOUR,
            transfer_buffer: 64 * KB,
            transfer_directory: default_transfer_directory(),
            transfer_port: 40818,
            broadcast_port: 40816,
            broadcast_timeout: 30 * SECOND,
            broadcast_interval: 5 * SECOND,
        }
    }
}

impl UserSettings {
    /// Gets the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::DeviceName => self.device_name.clone().into(),
            SettingKey::UpdateInterval => self.update_interval.into(),
            SettingKey::TransferBuffer => self.transfer_buffer.into(),
            SettingKey::TransferDirectory => self.transfer_directory.clone().into(),
            SettingKey::TransferPort => self.transfer_port.into(),
            SettingKey::BroadcastPort => self.broadcast_port.into(),
            SettingKey::BroadcastTimeout => self.broadcast_timeout.into(),
            SettingKey::BroadcastInterval => self.broadcast_interval.into(),
        }
    }

    /// Stores `value` under `key` after checking it fits the key.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` if the value has the wrong kind,
    /// is negative, or is out of range for a port.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        validate(key, &value)?;

        match (key, value) {
            (SettingKey::DeviceName, SettingValue::Text(text)) => self.device_name = text,
            (SettingKey::TransferDirectory, SettingValue::Text(text)) => {
                self.transfer_directory = text;
            }
            (SettingKey::UpdateInterval, SettingValue::Integer(v)) => self.update_interval = v,
            (SettingKey::TransferBuffer, SettingValue::Integer(v)) => self.transfer_buffer = v,
            (SettingKey::TransferPort, SettingValue::Integer(v)) => self.transfer_port = v,
            (SettingKey::BroadcastPort, SettingValue::Integer(v)) => self.broadcast_port = v,
            (SettingKey::BroadcastTimeout, SettingValue::Integer(v)) => self.broadcast_timeout = v,
            (SettingKey::BroadcastInterval, SettingValue::Integer(v)) => {
                self.broadcast_interval = v;
            }
            (key, _) => {
                return Err(SettingsError::InvalidValue {
                    reason: format!("{} has the wrong value type", key.name()),
                });
            }
        }

        Ok(())
    }
}

fn validate(key: SettingKey, value: &SettingValue) -> Result<(), SettingsError> {
    if value.kind() != key.kind() {
        return Err(SettingsError::InvalidValue {
            reason: format!("{} expects a {:?} value", key.name(), key.kind()),
        });
    }

    if let SettingValue::Integer(v) = value {
        if *v < 0 {
            return Err(SettingsError::InvalidValue {
                reason: format!("{} cannot be negative ({v})", key.name()),
            });
        }
        if key.is_port() && *v > MAX_PORT {
            return Err(SettingsError::InvalidValue {
                reason: format!("{} must not exceed {MAX_PORT} ({v})", key.name()),
            });
        }
    }

    Ok(())
}

/// Handles loading, saving, and resetting of user settings.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe user settings storage.
    settings: RwLock<UserSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path (for testing).
    ///
    /// # Arguments
    ///
    /// * `config_path` - Custom path for the settings file
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            from_str(&contents)?
        } else {
            debug!("Using default settings, no file at {:?}", config_path);
            UserSettings::default()
        };

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Gets the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.settings.read().get(key)
    }

    /// Gets a text setting, or an empty string for integer keys.
    #[must_use]
    pub fn get_text(&self, key: SettingKey) -> String {
        self.get(key).as_text().unwrap_or_default().to_string()
    }

    /// Gets an integer setting, or 0 for text keys.
    #[must_use]
    pub fn get_integer(&self, key: SettingKey) -> i64 {
        self.get(key).as_integer().unwrap_or_default()
    }

    /// Stores a single setting and saves the settings to disk.
    ///
    /// The in-memory value only changes once the file is written.
    ///
    /// # Arguments
    ///
    /// * `key` - Setting to change.
    /// * `value` - New value in raw stored units.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` for values that don't fit the key,
    /// or an IO/serialization error if saving fails.
    pub fn set(&self, key: SettingKey, value: impl Into<SettingValue>) -> Result<(), SettingsError> {
        let value = value.into();
        debug!(key = key.name(), ?value, "Setting value");

        let mut settings = self.settings.write();
        let mut next = settings.clone();
        next.set(key, value)?;
        self.save_settings(&next)?;
        *settings = next;
        Ok(())
    }

    /// Replaces the whole settings struct and saves it to disk.
    ///
    /// Nothing changes in memory if the file can't be written.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be saved to disk.
    pub fn update_settings(&self, new_settings: UserSettings) -> Result<(), SettingsError> {
        let mut settings = self.settings.write();
        self.save_settings(&new_settings)?;
        *settings = new_settings;
        Ok(())
    }

    /// Resets every setting to its default and saves to disk.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be saved to disk.
    pub fn reset(&self) -> Result<(), SettingsError> {
        info!("Resetting all settings to defaults");
        self.update_settings(UserSettings::default())
    }

    fn save_settings(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(settings)?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Returns the path of the settings file under the XDG config directory.
#[must_use]
pub fn get_config_path() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nitroshare")
        .join("settings.json")
}

fn default_device_name() -> String {
    hostname::get()
        .ok()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "NitroShare".to_string())
}

fn default_transfer_directory() -> String {
    UserDirs::new()
        .map(|dirs| {
            dirs.download_dir()
                .unwrap_or_else(|| dirs.home_dir())
                .to_path_buf()
        })
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use {serde_json::from_str, tempfile::TempDir};

    use crate::config::settings::{
        HOUR, KB, SECOND, SettingKey, SettingValue, SettingsError, SettingsManager, UserSettings,
        get_config_path,
    };

    fn manager(dir: &TempDir) -> SettingsManager {
        SettingsManager::with_config_path(dir.path().join("nitroshare").join("settings.json"))
            .unwrap()
    }

    #[test]
    fn test_user_settings_default() {
        let settings = UserSettings::default();
        assert_eq!(settings.update_interval, 24 * HOUR);
        assert_eq!(settings.transfer_buffer, 64 * KB);
        assert_eq!(settings.transfer_port, 40818);
        assert_eq!(settings.broadcast_port, 40816);
        assert_eq!(settings.broadcast_timeout, 30 * SECOND);
        assert_eq!(settings.broadcast_interval, 5 * SECOND);
        assert!(!settings.device_name.is_empty());
        assert!(!settings.transfer_directory.is_empty());
    }

    #[test]
    fn test_every_key_resolves_to_its_kind() {
        let settings = UserSettings::default();
        for key in SettingKey::ALL {
            let value = settings.get(key);
            match key {
                SettingKey::DeviceName | SettingKey::TransferDirectory => {
                    assert!(value.as_text().is_some(), "{} should be text", key.name());
                }
                _ => assert!(value.as_integer().is_some(), "{} should be integer", key.name()),
            }
        }
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        write(&path, r#"{ "transfer_port": 5000 }"#).unwrap();

        let manager = SettingsManager::with_config_path(path).unwrap();
        assert_eq!(manager.get_integer(SettingKey::TransferPort), 5000);
        assert_eq!(manager.get_integer(SettingKey::BroadcastPort), 40816);
        assert_eq!(manager.get_integer(SettingKey::UpdateInterval), 24 * HOUR);
    }

    #[test]
    fn test_set_persists_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        manager.set(SettingKey::DeviceName, "workstation").unwrap();
        manager.set(SettingKey::TransferBuffer, 128 * KB).unwrap();

        let reloaded = SettingsManager::with_config_path(manager.get_config_path().clone()).unwrap();
        assert_eq!(reloaded.get_text(SettingKey::DeviceName), "workstation");
        assert_eq!(reloaded.get_integer(SettingKey::TransferBuffer), 128 * KB);

        let on_disk: UserSettings =
            from_str(&std::fs::read_to_string(manager.get_config_path()).unwrap()).unwrap();
        assert_eq!(on_disk.transfer_buffer, 128 * KB);
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        let wrong_kind = manager.set(SettingKey::TransferPort, "not a number");
        assert!(matches!(wrong_kind, Err(SettingsError::InvalidValue { .. })));

        let negative = manager.set(SettingKey::BroadcastTimeout, -1_i64);
        assert!(matches!(negative, Err(SettingsError::InvalidValue { .. })));

        let port = manager.set(SettingKey::BroadcastPort, 70000_i64);
        assert!(matches!(port, Err(SettingsError::InvalidValue { .. })));

        assert_eq!(manager.get_integer(SettingKey::BroadcastPort), 40816);
        assert!(!manager.get_config_path().exists());
    }

    #[test]
    fn test_failed_save_keeps_previous_values() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);
        manager.set(SettingKey::DeviceName, "before").unwrap();

        // A directory where the settings file should be makes every write fail.
        std::fs::remove_file(manager.get_config_path()).unwrap();
        std::fs::create_dir(manager.get_config_path()).unwrap();

        let result = manager.set(SettingKey::DeviceName, "after");
        assert!(matches!(result, Err(SettingsError::IoError(_))));
        assert_eq!(manager.get_text(SettingKey::DeviceName), "before");

        let mut replacement = manager.get_settings().clone();
        replacement.transfer_port = 1234;
        assert!(manager.update_settings(replacement).is_err());
        assert_eq!(manager.get_integer(SettingKey::TransferPort), 40818);

        assert!(manager.reset().is_err());
        assert_eq!(manager.get_text(SettingKey::DeviceName), "before");
    }

    #[test]
    fn test_config_path_ends_in_app_dir() {
        let path = get_config_path();
        assert!(path.ends_with("nitroshare/settings.json"));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(&temp_dir);

        manager.set(SettingKey::TransferPort, 1234_i64).unwrap();
        manager.set(SettingKey::UpdateInterval, 0_i64).unwrap();
        manager.reset().unwrap();

        assert_eq!(manager.get_integer(SettingKey::TransferPort), 40818);
        assert_eq!(manager.get_integer(SettingKey::UpdateInterval), 24 * HOUR);
    }

    #[test]
    fn test_setting_value_accessors() {
        assert_eq!(SettingValue::from(5_i64).as_integer(), Some(5));
        assert_eq!(SettingValue::from(5_i64).as_text(), None);
        assert_eq!(SettingValue::from("x").as_text(), Some("x"));
    }

    #[test]
    fn test_settings_error_display() {
        let invalid_value_error = SettingsError::InvalidValue {
            reason: "test reason".to_string(),
        };
        assert_eq!(
            invalid_value_error.to_string(),
            "Invalid settings value: test reason"
        );
    }
}
