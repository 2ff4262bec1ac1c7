//! Settings dialog form state in display units.
//!
//! The form mirrors a subset of the settings store. Numeric fields are
//! converted through the binding tables below, which both loading and
//! storing walk, so the conversion pair can't drift apart.

use std::path::PathBuf;

use crate::config::{
    HOUR, KB, MAX_PORT, SECOND, SettingKey, SettingValue, SettingsError, SettingsManager,
    UserSettings,
};

/// Numeric controls on the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    UpdateInterval,
    TransferBuffer,
    TransferPort,
    BroadcastPort,
    BroadcastTimeout,
    BroadcastInterval,
}

impl NumericField {
    /// All numeric fields, in form order.
    pub const ALL: [NumericField; 6] = [
        NumericField::UpdateInterval,
        NumericField::TransferBuffer,
        NumericField::TransferPort,
        NumericField::BroadcastPort,
        NumericField::BroadcastTimeout,
        NumericField::BroadcastInterval,
    ];
}

/// Text controls on the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    DeviceName,
    TransferDirectory,
}

impl TextField {
    /// All text fields, in form order.
    pub const ALL: [TextField; 2] = [TextField::DeviceName, TextField::TransferDirectory];
}

/// Ties a numeric form field to a setting key.
///
/// `display = stored / scale` when loading, `stored = display * scale` when
/// storing. `min` and `max` bound the display value like a spin button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericBinding {
    pub key: SettingKey,
    pub field: NumericField,
    pub scale: i64,
    pub min: i64,
    pub max: i64,
}

impl NumericBinding {
    /// Converts a stored value to its display value, clamped into range.
    #[must_use]
    pub fn to_display(&self, stored: i64) -> i64 {
        (stored / self.scale).clamp(self.min, self.max)
    }

    /// Converts a display value back to stored units.
    #[must_use]
    pub fn to_stored(&self, display: i64) -> i64 {
        display * self.scale
    }

    /// Clamps a display value into the field's range.
    #[must_use]
    pub fn clamp(&self, display: i64) -> i64 {
        display.clamp(self.min, self.max)
    }
}

/// Ties a verbatim text form field to a setting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBinding {
    pub key: SettingKey,
    pub field: TextField,
}

/// The update interval, shown in hours. Only used when update checking is
/// available, and stored as 0 when checking is switched off.
pub const UPDATE_INTERVAL_BINDING: NumericBinding = NumericBinding {
    key: SettingKey::UpdateInterval,
    field: NumericField::UpdateInterval,
    scale: HOUR,
    min: 1,
    max: 720,
};

/// Numeric fields that are always present and convert uniformly.
pub const NUMERIC_BINDINGS: [NumericBinding; 5] = [
    NumericBinding {
        key: SettingKey::TransferBuffer,
        field: NumericField::TransferBuffer,
        scale: KB,
        min: 1,
        max: 65536,
    },
    NumericBinding {
        key: SettingKey::TransferPort,
        field: NumericField::TransferPort,
        scale: 1,
        min: 1,
        max: MAX_PORT,
    },
    NumericBinding {
        key: SettingKey::BroadcastPort,
        field: NumericField::BroadcastPort,
        scale: 1,
        min: 1,
        max: MAX_PORT,
    },
    NumericBinding {
        key: SettingKey::BroadcastTimeout,
        field: NumericField::BroadcastTimeout,
        scale: SECOND,
        min: 1,
        max: 3600,
    },
    NumericBinding {
        key: SettingKey::BroadcastInterval,
        field: NumericField::BroadcastInterval,
        scale: SECOND,
        min: 1,
        max: 3600,
    },
];

/// Text fields, copied verbatim in both directions.
pub const TEXT_BINDINGS: [TextBinding; 2] = [
    TextBinding {
        key: SettingKey::DeviceName,
        field: TextField::DeviceName,
    },
    TextBinding {
        key: SettingKey::TransferDirectory,
        field: TextField::TransferDirectory,
    },
];

/// Looks up the binding for a numeric field.
#[must_use]
pub fn binding_for(field: NumericField) -> &'static NumericBinding {
    if field == NumericField::UpdateInterval {
        return &UPDATE_INTERVAL_BINDING;
    }
    NUMERIC_BINDINGS
        .iter()
        .find(|binding| binding.field == field)
        .unwrap_or(&UPDATE_INTERVAL_BINDING)
}

/// Transient form state, in display units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub device_name: String,
    pub check_for_updates: bool,
    pub update_interval_hours: i64,
    pub transfer_buffer_kb: i64,
    pub transfer_directory: String,
    pub transfer_port: i64,
    pub broadcast_port: i64,
    pub broadcast_timeout_secs: i64,
    pub broadcast_interval_secs: i64,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            device_name: String::new(),
            check_for_updates: false,
            update_interval_hours: UPDATE_INTERVAL_BINDING.min,
            transfer_buffer_kb: 1,
            transfer_directory: String::new(),
            transfer_port: 1,
            broadcast_port: 1,
            broadcast_timeout_secs: 1,
            broadcast_interval_secs: 1,
        }
    }
}

impl SettingsForm {
    /// Reads a numeric field.
    #[must_use]
    pub fn numeric(&self, field: NumericField) -> i64 {
        match field {
            NumericField::UpdateInterval => self.update_interval_hours,
            NumericField::TransferBuffer => self.transfer_buffer_kb,
            NumericField::TransferPort => self.transfer_port,
            NumericField::BroadcastPort => self.broadcast_port,
            NumericField::BroadcastTimeout => self.broadcast_timeout_secs,
            NumericField::BroadcastInterval => self.broadcast_interval_secs,
        }
    }

    /// Writes a numeric field, clamped into its range.
    pub fn set_numeric(&mut self, field: NumericField, value: i64) {
        let value = binding_for(field).clamp(value);
        let slot = match field {
            NumericField::UpdateInterval => &mut self.update_interval_hours,
            NumericField::TransferBuffer => &mut self.transfer_buffer_kb,
            NumericField::TransferPort => &mut self.transfer_port,
            NumericField::BroadcastPort => &mut self.broadcast_port,
            NumericField::BroadcastTimeout => &mut self.broadcast_timeout_secs,
            NumericField::BroadcastInterval => &mut self.broadcast_interval_secs,
        };
        *slot = value;
    }

    /// Reads a text field.
    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::DeviceName => &self.device_name,
            TextField::TransferDirectory => &self.transfer_directory,
        }
    }

    /// Writes a text field verbatim.
    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        let value = value.into();
        match field {
            TextField::DeviceName => self.device_name = value,
            TextField::TransferDirectory => self.transfer_directory = value,
        }
    }

    /// Takes the result of the directory chooser.
    ///
    /// # Arguments
    ///
    /// * `selection` - Chosen directory, or `None` if the chooser was cancelled.
    ///
    /// # Returns
    ///
    /// `true` if the transfer directory was replaced.
    pub fn apply_directory_selection(&mut self, selection: Option<PathBuf>) -> bool {
        match selection {
            Some(path) => {
                self.transfer_directory = path.to_string_lossy().into_owned();
                true
            }
            None => false,
        }
    }

    /// Fills the text fields and the uniform numeric fields from the store.
    pub(crate) fn load_common(&mut self, settings: &SettingsManager) {
        for binding in &TEXT_BINDINGS {
            self.set_text(binding.field, settings.get_text(binding.key));
        }
        for binding in &NUMERIC_BINDINGS {
            let stored = settings.get_integer(binding.key);
            self.set_numeric(binding.field, binding.to_display(stored));
        }
    }

    /// Writes the text fields and the uniform numeric fields into `settings`.
    ///
    /// # Errors
    ///
    /// Returns the first `SettingsError` a value is rejected with.
    pub(crate) fn store_common(&self, settings: &mut UserSettings) -> Result<(), SettingsError> {
        for binding in &TEXT_BINDINGS {
            settings.set(binding.key, self.text(binding.field).into())?;
        }
        for binding in &NUMERIC_BINDINGS {
            let stored = binding.to_stored(self.numeric(binding.field));
            settings.set(binding.key, SettingValue::Integer(stored))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::{
        config::{HOUR, KB, SECOND},
        ui::preferences::form::{
            NUMERIC_BINDINGS, NumericField, SettingsForm, TEXT_BINDINGS, TextField,
            UPDATE_INTERVAL_BINDING, binding_for,
        },
    };

    #[test]
    fn test_scale_factors() {
        assert_eq!(binding_for(NumericField::TransferBuffer).scale, KB);
        assert_eq!(binding_for(NumericField::TransferPort).scale, 1);
        assert_eq!(binding_for(NumericField::BroadcastPort).scale, 1);
        assert_eq!(binding_for(NumericField::BroadcastTimeout).scale, SECOND);
        assert_eq!(binding_for(NumericField::BroadcastInterval).scale, SECOND);
        assert_eq!(binding_for(NumericField::UpdateInterval).scale, HOUR);
    }

    #[test]
    fn test_every_field_has_one_binding() {
        for binding in &NUMERIC_BINDINGS {
            assert_eq!(binding_for(binding.field), binding);
        }
        assert!(
            NUMERIC_BINDINGS
                .iter()
                .all(|binding| binding.key != UPDATE_INTERVAL_BINDING.key)
        );
        assert_eq!(TEXT_BINDINGS.len(), 2);
    }

    #[test]
    fn test_conversion_truncates_and_clamps() {
        let buffer = binding_for(NumericField::TransferBuffer);
        assert_eq!(buffer.to_display(4096), 4);
        assert_eq!(buffer.to_display(5000), 4);
        assert_eq!(buffer.to_display(0), 1);
        assert_eq!(buffer.to_stored(4), 4096);

        let hours = binding_for(NumericField::UpdateInterval);
        assert_eq!(hours.to_display(0), 1);
        assert_eq!(hours.to_display(10_000 * HOUR), 720);
    }

    #[test]
    fn test_set_numeric_clamps() {
        let mut form = SettingsForm::default();
        form.set_numeric(NumericField::TransferPort, 70000);
        assert_eq!(form.transfer_port, 65535);
        form.set_numeric(NumericField::BroadcastTimeout, 0);
        assert_eq!(form.broadcast_timeout_secs, 1);
        form.set_numeric(NumericField::UpdateInterval, 12);
        assert_eq!(form.numeric(NumericField::UpdateInterval), 12);
    }

    #[test]
    fn test_directory_selection() {
        let mut form = SettingsForm {
            transfer_directory: "/home/user/Downloads".to_string(),
            ..SettingsForm::default()
        };

        assert!(!form.apply_directory_selection(None));
        assert_eq!(form.transfer_directory, "/home/user/Downloads");

        assert!(form.apply_directory_selection(Some(PathBuf::from("/srv/incoming files"))));
        assert_eq!(form.transfer_directory, "/srv/incoming files");
    }

    #[test]
    fn test_directory_selection_on_blank_form() {
        let mut form = SettingsForm::default();
        assert!(form.apply_directory_selection(Some(PathBuf::from("/mnt/share"))));
        assert_eq!(form.text(TextField::TransferDirectory), "/mnt/share");
        assert_eq!(form.text(TextField::DeviceName), "");
    }
}
