//! Operational error context propagation with `anyhow`.
//!
//! This module provides an extension trait for attaching context to errors
//! and a reporter that routes errors through `tracing`.

use std::error::Error as StdError;

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    tracing::{error, warn},
};

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }
}

/// Centralized error reporting and logging.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Reports a recoverable error.
    pub fn warn(error: &Error, context: &str) {
        warn!(context = context, error = %error, "Recoverable error");
    }

    /// Reports an error the user has to act on.
    pub fn error(error: &Error, context: &str) {
        error!(context = context, error = format!("{error:#}"), "Operation failed");
    }

    /// Converts an error chain to a single line for display to users.
    pub fn to_user_message(error: &Error) -> String {
        format!("{error:#}")
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::{
        config::SettingsError,
        error::operational::{ErrorReporter, ResultExt},
    };

    fn invalid() -> Result<(), SettingsError> {
        Err(SettingsError::InvalidValue {
            reason: "port out of range".to_string(),
        })
    }

    #[test]
    fn test_result_ext_with_context() {
        let error = invalid().add_context("Saving settings").unwrap_err();
        assert_eq!(error.to_string(), "Saving settings");
        assert!(error.root_cause().to_string().contains("port out of range"));
    }

    #[test]
    fn test_error_reporter_user_message() {
        let error = invalid().add_context("Saving settings").unwrap_err();
        assert_eq!(
            ErrorReporter::to_user_message(&error),
            "Saving settings: Invalid settings value: port out of range"
        );

        let plain = anyhow!("Test error message");
        assert_eq!(ErrorReporter::to_user_message(&plain), "Test error message");
    }
}
