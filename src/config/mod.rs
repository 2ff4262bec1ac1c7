//! User settings and their persistent storage.
//!
//! This module provides typed access to the application's settings keys,
//! their defaults and raw units, and JSON persistence in the XDG config
//! directory.

pub mod settings;

pub use settings::{
    HOUR, KB, MAX_PORT, MINUTE, SECOND, SettingKey, SettingValue, SettingsError, SettingsManager,
    UserSettings, ValueKind, get_config_path,
};
