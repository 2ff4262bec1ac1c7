//! NitroShare - local network file transfer
//!
//! Settings, update checking and the Libadwaita user interface of a desktop
//! file-transfer application. The settings dialog edits the device name,
//! transfer and broadcast parameters and the update-check interval.

pub mod config;
pub mod error;
pub mod state;
pub mod ui;
pub mod update;

// Re-export key types for convenience
pub use {
    config::{SettingKey, SettingValue, SettingsManager, UserSettings},
    error::UiError,
    state::{AppState, AppStateEvent},
    ui::{NitroShareApplication, SettingsDialog},
    update::{UpdateService, UpdateSupport},
};
