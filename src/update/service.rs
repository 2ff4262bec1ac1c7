//! Update checker task and the handle that owns it.

use std::{sync::Arc, time::Duration};

use {
    parking_lot::Mutex,
    tokio::{
        runtime::Handle,
        sync::broadcast::{Receiver, Sender, channel},
        task::JoinHandle,
        time::{MissedTickBehavior::Delay, interval},
    },
    tracing::{debug, info},
};

use crate::config::{SettingKey, SettingsManager};

/// Events emitted by a running update checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateCheckerEvent {
    /// The configured interval elapsed and a version check should run.
    CheckDue,
}

/// A running checker: the timer task plus the period it was started with.
struct UpdateChecker {
    period: Duration,
    task: JoinHandle<()>,
}

impl Drop for UpdateChecker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Owned handle to the update checker.
///
/// At most one checker runs at a time. `configure` replaces it and
/// `shutdown` tears it down; both may be called any number of times.
pub struct UpdateService {
    runtime: Handle,
    checker: Mutex<Option<UpdateChecker>>,
    events_tx: Sender<UpdateCheckerEvent>,
}

impl UpdateService {
    /// Creates a service with no checker running.
    ///
    /// # Arguments
    ///
    /// * `runtime` - Tokio runtime the checker's timer task is spawned on.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        let (events_tx, _) = channel(4);
        Self {
            runtime,
            checker: Mutex::new(None),
            events_tx,
        }
    }

    /// Starts (or restarts) the checker with a new period.
    ///
    /// The first check is due immediately. A zero period shuts the checker
    /// down instead.
    ///
    /// # Arguments
    ///
    /// * `period` - Time between checks.
    pub fn configure(&self, period: Duration) {
        if period.is_zero() {
            self.shutdown();
            return;
        }

        let events_tx = self.events_tx.clone();
        let task = self.runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(Delay);
            loop {
                ticker.tick().await;
                debug!(?period, "UpdateService: Check due");
                let _ = events_tx.send(UpdateCheckerEvent::CheckDue);
            }
        });

        // Replacing the old checker drops it, which aborts its task.
        *self.checker.lock() = Some(UpdateChecker { period, task });
        info!(?period, "Update checker configured");
    }

    /// Tears down the running checker, if any.
    pub fn shutdown(&self) {
        if self.checker.lock().take().is_some() {
            info!("Update checker shut down");
        }
    }

    /// Returns whether a checker is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.checker.lock().is_some()
    }

    /// Returns the running checker's period.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.checker.lock().as_ref().map(|checker| checker.period)
    }

    /// Subscribes to checker events.
    pub fn subscribe(&self) -> Receiver<UpdateCheckerEvent> {
        self.events_tx.subscribe()
    }

    /// Configures or shuts down the checker from the stored update interval.
    ///
    /// # Arguments
    ///
    /// * `settings` - Settings store holding `UpdateInterval` in milliseconds.
    pub fn apply_settings(&self, settings: &SettingsManager) {
        let millis = settings.get_integer(SettingKey::UpdateInterval);
        let period = Duration::from_millis(u64::try_from(millis).unwrap_or_default());
        self.configure(period);
    }
}

/// Whether this build offers update checking.
#[derive(Clone)]
pub enum UpdateSupport {
    /// Update checking is built in and driven by this service.
    Available(Arc<UpdateService>),
    /// Update checking is not part of this build; its controls are absent.
    Unavailable,
}

impl UpdateSupport {
    /// Chooses the variant matching the `update-checker` cargo feature.
    ///
    /// # Arguments
    ///
    /// * `service` - Service to use when the feature is enabled.
    #[must_use]
    pub fn from_build(service: Arc<UpdateService>) -> Self {
        if cfg!(feature = "update-checker") {
            UpdateSupport::Available(service)
        } else {
            UpdateSupport::Unavailable
        }
    }

    /// Returns the service when update checking is available.
    #[must_use]
    pub fn service(&self) -> Option<&Arc<UpdateService>> {
        match self {
            UpdateSupport::Available(service) => Some(service),
            UpdateSupport::Unavailable => None,
        }
    }

    /// Returns whether update checking is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.service().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use {
        tempfile::TempDir,
        tokio::{runtime::Handle, time::timeout},
    };

    use crate::{
        config::{HOUR, SettingKey, SettingsManager},
        update::{UpdateCheckerEvent::CheckDue, UpdateService, UpdateSupport},
    };

    #[tokio::test]
    async fn test_service_starts_idle() {
        let service = UpdateService::new(Handle::current());
        assert!(!service.is_running());
        assert_eq!(service.interval(), None);
    }

    #[tokio::test]
    async fn test_configure_and_shutdown() {
        let service = UpdateService::new(Handle::current());

        service.configure(Duration::from_secs(3600));
        assert!(service.is_running());
        assert_eq!(service.interval(), Some(Duration::from_secs(3600)));

        service.configure(Duration::from_secs(7200));
        assert_eq!(service.interval(), Some(Duration::from_secs(7200)));

        service.shutdown();
        assert!(!service.is_running());
        service.shutdown();
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_zero_period_shuts_down() {
        let service = UpdateService::new(Handle::current());
        service.configure(Duration::from_secs(60));
        service.configure(Duration::ZERO);
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_checker_emits_check_due() {
        let service = UpdateService::new(Handle::current());
        let mut events = service.subscribe();

        service.configure(Duration::from_secs(3600));

        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("first check should be due immediately")
            .unwrap();
        assert_eq!(event, CheckDue);
    }

    #[tokio::test]
    async fn test_apply_settings_follows_update_interval() {
        let temp_dir = TempDir::new().unwrap();
        let settings =
            SettingsManager::with_config_path(temp_dir.path().join("settings.json")).unwrap();
        let service = UpdateService::new(Handle::current());

        settings.set(SettingKey::UpdateInterval, 2 * HOUR).unwrap();
        service.apply_settings(&settings);
        assert_eq!(service.interval(), Some(Duration::from_secs(2 * 3600)));

        settings.set(SettingKey::UpdateInterval, 0_i64).unwrap();
        service.apply_settings(&settings);
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_update_support_variants() {
        let service = Arc::new(UpdateService::new(Handle::current()));
        assert!(UpdateSupport::Available(service.clone()).is_available());
        assert!(!UpdateSupport::Unavailable.is_available());
        assert_eq!(
            UpdateSupport::from_build(service).is_available(),
            cfg!(feature = "update-checker")
        );
    }
}
