//! Settings dialog widgets.
//!
//! This module implements the `SettingsDialog`: a Libadwaita dialog with
//! General, Transfer and Broadcast groups, explicit Save and Cancel buttons,
//! a reset action and a directory chooser. All reading and writing of
//! settings goes through [`SettingsController`].

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use {
    anyhow::Error,
    libadwaita::{
        AlertDialog, Dialog, EntryRow, HeaderBar, PreferencesGroup, PreferencesPage,
        ResponseAppearance::{Destructive, Suggested},
        SpinRow, SwitchRow, ToolbarView,
        glib::{MainContext, WeakRef},
        gtk::{
            AccessibleRole::Group, Adjustment, Align::Center, Button, FileDialog, Widget, Window,
        },
        prelude::{
            AdwDialogExt, AlertDialogExt, ButtonExt, Cast, EditableExt, EntryRowExt, FileExt,
            IsA, ObjectExt, PreferencesGroupExt, PreferencesPageExt, WidgetExt,
        },
    },
    tracing::debug,
};

use crate::{
    error::{ErrorReporter, UiError},
    ui::preferences::{
        controller::{
            DialogResponse::{self, Rejected},
            RESET_ERROR_TITLE, RESET_MESSAGE, RESET_TITLE,
            ResetConfirmation::{Confirmed, Declined},
            SAVE_ERROR_TITLE, SELECT_DIRECTORY_TITLE, SettingsController,
        },
        form::{NumericField, SettingsForm, TextField, binding_for},
    },
};

/// The form controls, one per form field.
#[derive(Clone)]
struct SettingsRows {
    device_name: EntryRow,
    check_for_updates: SwitchRow,
    update_interval: SpinRow,
    transfer_buffer: SpinRow,
    transfer_directory: EntryRow,
    transfer_port: SpinRow,
    broadcast_port: SpinRow,
    broadcast_timeout: SpinRow,
    broadcast_interval: SpinRow,
}

impl SettingsRows {
    fn new() -> Self {
        Self {
            device_name: EntryRow::builder().title("Device Name").build(),
            check_for_updates: SwitchRow::builder()
                .title("Check for Updates")
                .subtitle("Periodically look for new versions")
                .build(),
            update_interval: spin_row(
                "Update Interval",
                "Hours between checks",
                NumericField::UpdateInterval,
            ),
            transfer_buffer: spin_row(
                "Buffer Size",
                "Kilobytes read per chunk",
                NumericField::TransferBuffer,
            ),
            transfer_directory: EntryRow::builder().title("Directory").build(),
            transfer_port: spin_row(
                "Port",
                "TCP port for incoming transfers",
                NumericField::TransferPort,
            ),
            broadcast_port: spin_row("Port", "UDP port for discovery", NumericField::BroadcastPort),
            broadcast_timeout: spin_row(
                "Timeout",
                "Seconds before a silent device is removed",
                NumericField::BroadcastTimeout,
            ),
            broadcast_interval: spin_row(
                "Interval",
                "Seconds between broadcasts",
                NumericField::BroadcastInterval,
            ),
        }
    }

    fn spin(&self, field: NumericField) -> &SpinRow {
        match field {
            NumericField::UpdateInterval => &self.update_interval,
            NumericField::TransferBuffer => &self.transfer_buffer,
            NumericField::TransferPort => &self.transfer_port,
            NumericField::BroadcastPort => &self.broadcast_port,
            NumericField::BroadcastTimeout => &self.broadcast_timeout,
            NumericField::BroadcastInterval => &self.broadcast_interval,
        }
    }

    fn entry(&self, field: TextField) -> &EntryRow {
        match field {
            TextField::DeviceName => &self.device_name,
            TextField::TransferDirectory => &self.transfer_directory,
        }
    }

    /// Copies form values into the widgets.
    fn populate(&self, form: &SettingsForm) {
        for field in TextField::ALL {
            self.entry(field).set_text(form.text(field));
        }
        for field in NumericField::ALL {
            self.spin(field).set_value(form.numeric(field) as f64);
        }
        self.check_for_updates.set_active(form.check_for_updates);
        self.update_interval.set_sensitive(form.check_for_updates);
    }

    /// Reads the widgets back into a form.
    fn collect(&self) -> SettingsForm {
        let mut form = SettingsForm::default();
        for field in TextField::ALL {
            form.set_text(field, self.entry(field).text().as_str());
        }
        for field in NumericField::ALL {
            form.set_numeric(field, self.spin(field).value().round() as i64);
        }
        form.check_for_updates = self.check_for_updates.is_active();
        form
    }
}

fn spin_row(title: &str, subtitle: &str, field: NumericField) -> SpinRow {
    let binding = binding_for(field);
    let adjustment = Adjustment::new(
        binding.min as f64,
        binding.min as f64,
        binding.max as f64,
        1.0,
        10.0,
        0.0,
    );

    SpinRow::builder()
        .title(title)
        .subtitle(subtitle)
        .adjustment(&adjustment)
        .numeric(true)
        .build()
}

/// Records the dialog's single response and fans it out to listeners.
#[derive(Default)]
struct ResponseState {
    response: Cell<Option<DialogResponse>>,
    handlers: RefCell<Vec<Rc<dyn Fn(DialogResponse)>>>,
}

impl ResponseState {
    /// Records `response` unless one was already recorded, then notifies.
    ///
    /// Handlers run on a snapshot of the list, so a handler may register
    /// further handlers. Those are not called for this response.
    ///
    /// # Returns
    ///
    /// `true` if this call recorded the response.
    fn record(&self, response: DialogResponse) -> bool {
        if self.response.get().is_some() {
            return false;
        }
        self.response.set(Some(response));
        debug!(?response, "SettingsDialog: Finished");
        let handlers = self.handlers.borrow().clone();
        for handler in &handlers {
            handler(response);
        }
        true
    }

    fn add_handler(&self, handler: impl Fn(DialogResponse) + 'static) {
        self.handlers.borrow_mut().push(Rc::new(handler));
    }

    /// Records `response` and closes the dialog.
    fn finish(&self, dialog: &WeakRef<Dialog>, response: DialogResponse) {
        if self.record(response)
            && let Some(dialog) = dialog.upgrade()
        {
            dialog.close();
        }
    }
}

/// Modal settings dialog with Save, Cancel and Reset actions.
pub struct SettingsDialog {
    /// The underlying Libadwaita dialog widget.
    pub widget: Dialog,
    /// Saves the form and closes the dialog.
    pub save_button: Button,
    /// Closes the dialog without saving.
    pub cancel_button: Button,
    /// Asks for confirmation, then resets every setting to its default.
    pub reset_button: Button,
    /// Opens the directory chooser for the transfer directory.
    pub select_directory_button: Button,
    rows: SettingsRows,
    controller: SettingsController,
    state: Rc<ResponseState>,
}

impl SettingsDialog {
    /// Creates the dialog and fills it from the current settings.
    ///
    /// # Arguments
    ///
    /// * `controller` - Controller bound to the settings store
    ///
    /// # Returns
    ///
    /// A new `SettingsDialog` instance, not yet presented.
    pub fn new(controller: SettingsController) -> Self {
        let widget = Dialog::builder()
            .title("Settings")
            .content_width(560)
            .content_height(640)
            .build();

        let save_button = Button::builder()
            .label("Save")
            .css_classes(["suggested-action"])
            .build();
        let cancel_button = Button::builder().label("Cancel").build();
        let reset_button = Button::builder()
            .label("Reset to Defaults")
            .css_classes(["destructive-action"])
            .halign(Center)
            .margin_top(12)
            .build();
        let select_directory_button = Button::builder()
            .icon_name("folder-open-symbolic")
            .tooltip_text(SELECT_DIRECTORY_TITLE)
            .valign(Center)
            .css_classes(["flat"])
            .build();

        let dialog = Self {
            widget,
            save_button,
            cancel_button,
            reset_button,
            select_directory_button,
            rows: SettingsRows::new(),
            controller,
            state: Rc::new(ResponseState::default()),
        };

        dialog.build_layout();
        dialog.rows.populate(&dialog.controller.load_form());
        dialog.connect_handlers();

        debug!("SettingsDialog: Created");

        dialog
    }

    fn build_layout(&self) {
        let rows = &self.rows;

        let header = HeaderBar::builder()
            .show_start_title_buttons(false)
            .show_end_title_buttons(false)
            .build();
        header.pack_start(&self.cancel_button);
        header.pack_end(&self.save_button);

        let page = PreferencesPage::builder().accessible_role(Group).build();

        let general = PreferencesGroup::builder().title("General").build();
        general.add(&rows.device_name);
        general.add(&rows.check_for_updates);
        general.add(&rows.update_interval);
        page.add(&general);

        if !self.controller.update_controls_visible() {
            rows.check_for_updates.set_visible(false);
            rows.update_interval.set_visible(false);
        }

        let transfer = PreferencesGroup::builder().title("Transfer").build();
        rows.transfer_directory.add_suffix(&self.select_directory_button);
        transfer.add(&rows.transfer_directory);
        transfer.add(&rows.transfer_buffer);
        transfer.add(&rows.transfer_port);
        page.add(&transfer);

        let broadcast = PreferencesGroup::builder()
            .title("Broadcast")
            .description("How this device finds others on the local network")
            .build();
        broadcast.add(&rows.broadcast_port);
        broadcast.add(&rows.broadcast_timeout);
        broadcast.add(&rows.broadcast_interval);
        page.add(&broadcast);

        let reset_group = PreferencesGroup::new();
        reset_group.add(&self.reset_button);
        page.add(&reset_group);

        let toolbar_view = ToolbarView::new();
        toolbar_view.add_top_bar(&header);
        toolbar_view.set_content(Some(&page));
        self.widget.set_child(Some(&toolbar_view));
    }

    fn connect_handlers(&self) {
        let update_interval = self.rows.update_interval.clone();
        self.rows
            .check_for_updates
            .connect_active_notify(move |row| update_interval.set_sensitive(row.is_active()));

        let dialog = self.widget.downgrade();
        let state = self.state.clone();
        self.cancel_button
            .connect_clicked(move |_| state.finish(&dialog, Rejected));

        // Escape and the close gesture end up here too.
        let state = self.state.clone();
        self.widget.connect_closed(move |_| {
            state.record(Rejected);
        });

        let dialog = self.widget.downgrade();
        let state = self.state.clone();
        let rows = self.rows.clone();
        let controller = self.controller.clone();
        self.save_button.connect_clicked(move |_| {
            match controller.accept(&rows.collect()) {
                Ok(response) => state.finish(&dialog, response),
                Err(e) => Self::show_error(
                    &dialog,
                    UiError::from(e).into(),
                    SAVE_ERROR_TITLE,
                    "Saving settings",
                ),
            }
        });

        let dialog = self.widget.downgrade();
        let state = self.state.clone();
        let controller = self.controller.clone();
        self.reset_button.connect_clicked(move |_| {
            Self::confirm_reset(&dialog, &state, &controller);
        });

        let entry = self.rows.transfer_directory.clone();
        self.select_directory_button.connect_clicked(move |button| {
            Self::select_directory(button, &entry);
        });
    }

    /// Asks whether to reset and applies the answer.
    fn confirm_reset(
        dialog: &WeakRef<Dialog>,
        state: &Rc<ResponseState>,
        controller: &SettingsController,
    ) {
        let Some(parent) = dialog.upgrade() else {
            return;
        };

        let alert = AlertDialog::builder()
            .heading(RESET_TITLE)
            .body(RESET_MESSAGE)
            .build();
        alert.add_response("no", "No");
        alert.add_response("yes", "Yes");
        alert.set_response_appearance("yes", Destructive);
        alert.set_default_response(Some("no"));
        alert.set_close_response("no");

        let dialog = dialog.clone();
        let state = state.clone();
        let controller = controller.clone();
        alert.connect_response(None, move |_, response| {
            let confirmation = if response == "yes" { Confirmed } else { Declined };
            match controller.reset(confirmation) {
                Ok(Some(response)) => state.finish(&dialog, response),
                Ok(None) => {}
                Err(e) => Self::show_error(
                    &dialog,
                    UiError::from(e).into(),
                    RESET_ERROR_TITLE,
                    "Resetting settings",
                ),
            }
        });

        alert.present(Some(&parent));
    }

    /// Lets the user pick the transfer directory.
    fn select_directory(button: &Button, entry: &EntryRow) {
        let chooser = FileDialog::builder()
            .title(SELECT_DIRECTORY_TITLE)
            .modal(true)
            .build();

        let window = button.root().and_then(|root| root.downcast::<Window>().ok());
        if window.is_none() {
            let error = UiError::MissingParentWindow {
                dialog: SELECT_DIRECTORY_TITLE,
            };
            ErrorReporter::warn(&error.into(), "Opening directory chooser");
        }

        let entry = entry.clone();
        MainContext::default().spawn_local(async move {
            let selection = match chooser.select_folder_future(window.as_ref()).await {
                Ok(folder) => folder.path(),
                Err(e) => {
                    debug!("Directory selection cancelled: {}", e);
                    None
                }
            };

            let mut form = SettingsForm::default();
            if form.apply_directory_selection(selection) {
                entry.set_text(form.text(TextField::TransferDirectory));
            }
        });
    }

    /// Logs a failed action and tells the user; the dialog stays open.
    fn show_error(dialog: &WeakRef<Dialog>, error: Error, heading: &str, context: &str) {
        ErrorReporter::error(&error, context);

        let Some(parent) = dialog.upgrade() else {
            return;
        };

        let alert = AlertDialog::builder()
            .heading(heading)
            .body(ErrorReporter::to_user_message(&error))
            .build();
        alert.add_response("close", "Close");
        alert.set_response_appearance("close", Suggested);
        alert.set_close_response("close");
        alert.present(Some(&parent));
    }

    /// Registers a callback for the dialog's response.
    ///
    /// The callback runs once, when the dialog is saved, cancelled, reset or
    /// dismissed.
    pub fn connect_response<F: Fn(DialogResponse) + 'static>(&self, callback: F) {
        self.state.add_handler(callback);
    }

    /// Returns how the dialog finished, or `None` while it is open.
    #[must_use]
    pub fn response(&self) -> Option<DialogResponse> {
        self.state.response.get()
    }

    /// Returns the current widget values as a form.
    #[must_use]
    pub fn form(&self) -> SettingsForm {
        self.rows.collect()
    }

    /// Returns whether the update-check rows are shown.
    #[must_use]
    pub fn update_controls_visible(&self) -> bool {
        self.rows.check_for_updates.is_visible() && self.rows.update_interval.is_visible()
    }

    /// Presents the dialog over `parent`.
    ///
    /// # Arguments
    ///
    /// * `parent` - Widget the dialog is modal to
    pub fn present(&self, parent: &impl IsA<Widget>) {
        debug!("SettingsDialog: Presenting");
        self.widget.present(Some(parent));
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::ui::preferences::{
        controller::{
            DialogResponse::{self, Accepted, Rejected},
            RESET_ERROR_TITLE, SAVE_ERROR_TITLE,
        },
        dialog::ResponseState,
    };

    #[test]
    fn test_response_is_recorded_once() {
        let state = ResponseState::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        state.add_handler({
            let seen = seen.clone();
            move |response| seen.borrow_mut().push(response)
        });

        assert!(state.record(Accepted));
        assert!(!state.record(Rejected));
        assert_eq!(state.response.get(), Some(Accepted));
        assert_eq!(*seen.borrow(), vec![Accepted]);
    }

    #[test]
    fn test_handler_can_register_handlers() {
        let state = Rc::new(ResponseState::default());
        let seen = Rc::new(RefCell::new(Vec::<DialogResponse>::new()));
        state.add_handler({
            let state = Rc::downgrade(&state);
            let seen = seen.clone();
            move |response| {
                seen.borrow_mut().push(response);
                if let Some(state) = state.upgrade() {
                    state.add_handler(|_| {});
                }
            }
        });

        assert!(state.record(Rejected));
        assert_eq!(*seen.borrow(), vec![Rejected]);
        assert_eq!(state.handlers.borrow().len(), 2);
    }

    #[test]
    fn test_error_headings_name_the_action() {
        assert_ne!(SAVE_ERROR_TITLE, RESET_ERROR_TITLE);
        assert!(RESET_ERROR_TITLE.contains("Reset"));
    }
}
