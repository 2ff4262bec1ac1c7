//! Load, accept and reset logic behind the settings dialog.
//!
//! `SettingsController` owns everything the dialog does to the settings store
//! and the rest of the application. The GTK view only moves values between
//! widgets and a [`SettingsForm`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::{SettingKey, SettingsError, SettingsManager},
    state::{
        AppState,
        AppStateEvent::{ConfigureUpdateChecker, SettingsChanged},
    },
    ui::preferences::form::{SettingsForm, UPDATE_INTERVAL_BINDING},
    update::UpdateSupport,
};

/// Title of the reset confirmation prompt.
pub const RESET_TITLE: &str = "Reset settings";

/// Body of the reset confirmation prompt.
pub const RESET_MESSAGE: &str = "Are you sure you want to reset all settings to their default \
                                 values? This cannot be undone.";

/// Heading shown when saving the form fails.
pub const SAVE_ERROR_TITLE: &str = "Couldn't Save Settings";

/// Heading shown when resetting to defaults fails.
pub const RESET_ERROR_TITLE: &str = "Couldn't Reset Settings";

/// Title of the directory chooser.
pub const SELECT_DIRECTORY_TITLE: &str = "Select Directory";

/// How the settings dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResponse {
    /// The user saved the form.
    Accepted,
    /// The dialog closed without saving the form.
    Rejected,
}

/// The user's answer to the reset confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetConfirmation {
    Confirmed,
    Declined,
}

/// Moves values between the settings store and a [`SettingsForm`].
#[derive(Clone)]
pub struct SettingsController {
    settings: Arc<SettingsManager>,
    updates: UpdateSupport,
    app_state: Arc<AppState>,
}

impl SettingsController {
    /// Creates a controller.
    ///
    /// # Arguments
    ///
    /// * `settings` - Settings store to read and write
    /// * `updates` - Whether update checking is part of this build
    /// * `app_state` - Event hub for change notifications
    #[must_use]
    pub fn new(
        settings: Arc<SettingsManager>,
        updates: UpdateSupport,
        app_state: Arc<AppState>,
    ) -> Self {
        Self {
            settings,
            updates,
            app_state,
        }
    }

    /// Returns whether the update-check controls exist in this build.
    #[must_use]
    pub fn update_controls_visible(&self) -> bool {
        self.updates.is_available()
    }

    /// Builds the form from the current settings.
    #[must_use]
    pub fn load_form(&self) -> SettingsForm {
        let mut form = SettingsForm::default();
        form.load_common(&self.settings);

        if self.updates.is_available() {
            let interval = self.settings.get_integer(SettingKey::UpdateInterval);
            form.check_for_updates = interval != 0;
            form.update_interval_hours = UPDATE_INTERVAL_BINDING.to_display(interval);
        }

        debug!(?form, "SettingsController: Loaded form");
        form
    }

    /// Writes the form back to the settings store.
    ///
    /// All values are applied to a copy of the current settings, which is
    /// then committed in a single save.
    ///
    /// # Arguments
    ///
    /// * `form` - Form values in display units
    ///
    /// # Returns
    ///
    /// `DialogResponse::Accepted` once everything is stored.
    ///
    /// # Errors
    ///
    /// Returns the first `SettingsError` reported. The store is left
    /// unchanged in that case.
    pub fn accept(&self, form: &SettingsForm) -> Result<DialogResponse, SettingsError> {
        let mut draft = self.settings.get_settings().clone();
        form.store_common(&mut draft)?;

        if self.updates.is_available() {
            let stored = if form.check_for_updates {
                UPDATE_INTERVAL_BINDING.to_stored(form.update_interval_hours)
            } else {
                0
            };
            draft.set(SettingKey::UpdateInterval, stored.into())?;
        }

        self.settings.update_settings(draft)?;

        if let UpdateSupport::Available(service) = &self.updates {
            if form.check_for_updates {
                self.app_state.notify(ConfigureUpdateChecker);
            } else {
                service.shutdown();
            }
        }
        self.app_state.notify(SettingsChanged);

        info!("Settings saved");
        Ok(DialogResponse::Accepted)
    }

    /// Resets every setting to its default if the user confirmed.
    ///
    /// # Arguments
    ///
    /// * `confirmation` - Answer to the reset prompt
    ///
    /// # Returns
    ///
    /// `None` if the user declined and the dialog stays open, otherwise
    /// `Some(DialogResponse::Rejected)`: the dialog closes without saving
    /// the form.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the defaults can't be written to disk.
    pub fn reset(
        &self,
        confirmation: ResetConfirmation,
    ) -> Result<Option<DialogResponse>, SettingsError> {
        if confirmation == ResetConfirmation::Declined {
            debug!("SettingsController: Reset declined");
            return Ok(None);
        }

        self.settings.reset()?;
        if self.updates.is_available() {
            self.app_state.notify(ConfigureUpdateChecker);
        }
        self.app_state.notify(SettingsChanged);

        Ok(Some(DialogResponse::Rejected))
    }
}
