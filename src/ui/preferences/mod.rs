//! Settings dialog for device, transfer and broadcast preferences.
//!
//! The dialog is split into a headless part (`form` and `controller`), which
//! owns unit conversion and every effect on the settings store, and the
//! Libadwaita view in `dialog`.


pub mod controller;
pub mod dialog;
pub mod form;

pub use {
    controller::{DialogResponse, ResetConfirmation, SettingsController},
    dialog::SettingsDialog,
    form::SettingsForm,
};
