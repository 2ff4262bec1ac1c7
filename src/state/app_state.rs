//! Application-wide notifications between the settings dialog and the shell.
//!
//! `AppState` carries one-way events from components that change settings to
//! any component that derives behavior from them. Senders never wait for
//! receivers and sending with nobody listening is not an error.

use {
    tokio::sync::broadcast::{Receiver, Sender, channel},
    tracing::debug,
};

/// Application state change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStateEvent {
    /// Update-check settings may have changed; listeners re-read them.
    ConfigureUpdateChecker,
    /// The settings store was rewritten by the settings dialog.
    SettingsChanged,
}

/// Central notification hub shared by the UI components.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast channel for state change notifications.
    state_tx: Sender<AppStateEvent>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates a new application state instance.
    #[must_use]
    pub fn new() -> Self {
        let (state_tx, _) = channel(16);
        Self { state_tx }
    }

    /// Sends `event` to every current subscriber.
    ///
    /// # Arguments
    ///
    /// * `event` - Event to broadcast.
    pub fn notify(&self, event: AppStateEvent) {
        let receivers = self.state_tx.send(event).unwrap_or(0);
        debug!(?event, receivers, "AppState: Event sent");
    }

    /// Subscribes to application state changes.
    ///
    /// # Returns
    ///
    /// A broadcast receiver for state change events.
    pub fn subscribe(&self) -> Receiver<AppStateEvent> {
        self.state_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::TryRecvError;

    use crate::state::{
        AppState,
        AppStateEvent::{ConfigureUpdateChecker, SettingsChanged},
    };

    #[test]
    fn test_notify_without_subscribers() {
        let app_state = AppState::new();
        app_state.notify(SettingsChanged);
    }

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let app_state = AppState::new();
        let mut first = app_state.subscribe();
        let mut second = app_state.subscribe();

        app_state.notify(ConfigureUpdateChecker);
        app_state.notify(SettingsChanged);

        for receiver in [&mut first, &mut second] {
            assert_eq!(receiver.try_recv().unwrap(), ConfigureUpdateChecker);
            assert_eq!(receiver.try_recv().unwrap(), SettingsChanged);
            assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
        }
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let app_state = AppState::new();
        app_state.notify(SettingsChanged);

        let mut receiver = app_state.subscribe();
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }
}
