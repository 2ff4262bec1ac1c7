//! Shared application state and change notifications.
//!
//! This module provides the event hub UI components use to react to
//! settings changes without holding references to each other.

pub mod app_state;

pub use app_state::{AppState, AppStateEvent};
