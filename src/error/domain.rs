//! Domain-specific error types using `thiserror`.
//!
//! Settings persistence errors live next to the store in
//! [`crate::config::SettingsError`]; this module holds the UI side.

use std::result::Result as StdResult;

use {anyhow::Error, thiserror::Error};

use crate::config::SettingsError;

/// UI-related errors.
#[derive(Error, Debug)]
pub enum UiError {
    /// A dialog needs a parent window that isn't available.
    #[error("No parent window for {dialog}")]
    MissingParentWindow { dialog: &'static str },
    /// Settings couldn't be written from a dialog.
    #[error("Failed to save settings: {0}")]
    SettingsError(#[from] SettingsError),
}

/// Operational error context propagation with `anyhow`.
///
/// This type is used for operational errors that need rich context
/// but don't require specific handling logic.
pub type Result<T> = StdResult<T, Error>;

#[cfg(test)]
mod tests {
    use crate::{config::SettingsError, error::domain::UiError};

    #[test]
    fn test_ui_error_display() {
        let parent_error = UiError::MissingParentWindow {
            dialog: "Select Directory",
        };
        assert_eq!(
            parent_error.to_string(),
            "No parent window for Select Directory"
        );
    }

    #[test]
    fn test_settings_error_conversion() {
        let error: UiError = SettingsError::InvalidValue {
            reason: "bad port".to_string(),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Failed to save settings: Invalid settings value: bad port"
        );
    }
}
