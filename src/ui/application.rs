//! Main application window and settings wiring.
//!
//! This module implements the `NitroShareApplication`, which owns the
//! settings store, the event hub and the update-checker service, and reacts
//! to the notifications the settings dialog sends.

use std::sync::Arc;

use {
    anyhow::Result,
    libadwaita::{
        Application, ApplicationWindow, StatusPage, ToolbarView,
        glib::MainContext,
        prelude::{
            AdwApplicationWindowExt, ApplicationExt, ApplicationExtManual, ButtonExt, GtkWindowExt,
        },
    },
    tokio::{
        runtime::Handle,
        sync::broadcast::{
            Receiver,
            error::RecvError::{Closed, Lagged},
        },
    },
    tracing::{debug, info, warn},
};

use crate::{
    config::{SettingKey, SettingsManager},
    error::ResultExt,
    state::{
        AppState,
        AppStateEvent::{ConfigureUpdateChecker, SettingsChanged},
    },
    ui::{
        header_bar::HeaderBar,
        preferences::{SettingsController, SettingsDialog},
    },
    update::{UpdateCheckerEvent, UpdateService, UpdateSupport},
};

/// Application identifier registered with the session bus.
pub const APPLICATION_ID: &str = "net.nitroshare.NitroShare";

/// Main application class with window management.
pub struct NitroShareApplication {
    /// The main application instance.
    pub app: Application,
    /// User settings store.
    pub settings: Arc<SettingsManager>,
    /// Event hub shared with the settings dialog.
    pub app_state: Arc<AppState>,
    /// Whether this build checks for updates, and the service doing it.
    pub updates: UpdateSupport,
}

impl NitroShareApplication {
    /// Creates a new application instance.
    ///
    /// Must be called from within a Tokio runtime; the update checker's
    /// timer runs on it.
    ///
    /// # Errors
    ///
    /// Returns an error if settings can't be loaded or no runtime is active.
    pub fn new() -> Result<Self> {
        let settings =
            Arc::new(SettingsManager::new().add_context("Failed to initialize settings")?);
        let runtime = Handle::try_current().add_context("No Tokio runtime for update checks")?;

        let updates = UpdateSupport::from_build(Arc::new(UpdateService::new(runtime.clone())));
        if let Some(service) = updates.service() {
            runtime.spawn(log_update_checks(service.subscribe()));
            service.apply_settings(&settings);
        }

        let app = Application::builder()
            .application_id(APPLICATION_ID)
            .build();

        info!(
            config = ?settings.get_config_path(),
            update_checks = updates.is_available(),
            "NitroShare initialized"
        );

        Ok(Self {
            app,
            settings,
            app_state: Arc::new(AppState::new()),
            updates,
        })
    }

    /// Runs the application.
    ///
    /// This method starts the GTK main loop and displays the main window.
    pub fn run(&self) {
        self.app.connect_activate({
            let settings = self.settings.clone();
            let app_state = self.app_state.clone();
            let updates = self.updates.clone();

            move |app| build_ui(app, &settings, &app_state, &updates)
        });

        self.app.run();
    }
}

/// Builds the main window.
fn build_ui(
    app: &Application,
    settings: &Arc<SettingsManager>,
    app_state: &Arc<AppState>,
    updates: &UpdateSupport,
) {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("NitroShare")
        .default_width(640)
        .default_height(480)
        .build();

    let header_bar = HeaderBar::new();
    let status_page = StatusPage::builder()
        .icon_name("folder-download-symbolic")
        .title("Ready to Receive")
        .build();
    refresh_summary(&header_bar, &status_page, settings);

    let toolbar_view = ToolbarView::new();
    toolbar_view.add_top_bar(&header_bar.widget);
    toolbar_view.set_content(Some(&status_page));
    window.set_content(Some(&toolbar_view));

    header_bar.settings_button.connect_clicked({
        let window = window.clone();
        let settings = settings.clone();
        let app_state = app_state.clone();
        let updates = updates.clone();

        move |_| {
            let controller =
                SettingsController::new(settings.clone(), updates.clone(), app_state.clone());
            let dialog = SettingsDialog::new(controller);
            dialog.connect_response(|response| debug!(?response, "Settings dialog closed"));
            dialog.present(&window);
        }
    });

    observe_settings_events(app_state, settings, updates, header_bar, status_page);

    window.present();
}

/// Reacts to settings notifications on the GTK main context.
fn observe_settings_events(
    app_state: &Arc<AppState>,
    settings: &Arc<SettingsManager>,
    updates: &UpdateSupport,
    header_bar: HeaderBar,
    status_page: StatusPage,
) {
    let mut receiver = app_state.subscribe();
    let settings = settings.clone();
    let updates = updates.clone();

    MainContext::default().spawn_local(async move {
        loop {
            match receiver.recv().await {
                Ok(ConfigureUpdateChecker) => {
                    if let Some(service) = updates.service() {
                        service.apply_settings(&settings);
                    }
                }
                Ok(SettingsChanged) => refresh_summary(&header_bar, &status_page, &settings),
                Err(Lagged(skipped)) => warn!(skipped, "Settings events lagged"),
                Err(Closed) => break,
            }
        }
    });
}

/// Logs every check the update checker reports as due.
async fn log_update_checks(mut receiver: Receiver<UpdateCheckerEvent>) {
    loop {
        match receiver.recv().await {
            Ok(UpdateCheckerEvent::CheckDue) => info!("Update check due"),
            Err(Lagged(skipped)) => warn!(skipped, "Update check events lagged"),
            Err(Closed) => break,
        }
    }
}

/// Shows the current device name, directory and port.
fn refresh_summary(header_bar: &HeaderBar, status_page: &StatusPage, settings: &SettingsManager) {
    header_bar.set_device_name(&settings.get_text(SettingKey::DeviceName));
    status_page.set_description(Some(&format!(
        "Files are saved to {}\nListening on port {}",
        settings.get_text(SettingKey::TransferDirectory),
        settings.get_integer(SettingKey::TransferPort)
    )));
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{runtime::Handle, time::timeout};

    use crate::{ui::application::log_update_checks, update::UpdateService};

    #[tokio::test]
    async fn test_update_check_logger_follows_service() {
        let service = UpdateService::new(Handle::current());
        let logger = tokio::spawn(log_update_checks(service.subscribe()));

        service.configure(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!logger.is_finished());

        drop(service);
        let finished = timeout(Duration::from_secs(1), logger).await;
        assert!(finished.is_ok());
    }
}
