//! User interface built with Libadwaita.
//!
//! This module provides the main application window, its header bar and the
//! settings dialog.

pub mod application;
pub mod header_bar;
pub mod preferences;

pub use {
    application::NitroShareApplication,
    header_bar::HeaderBar,
    preferences::{DialogResponse, SettingsDialog},
};
