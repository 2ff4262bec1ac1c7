//! Periodic update checking.
//!
//! The checker is owned by the application through an [`UpdateService`]
//! handle instead of living in a global. Whether the application offers
//! update checking at all is decided by the `update-checker` cargo feature,
//! surfaced at runtime as [`UpdateSupport`].

pub mod service;

pub use service::{UpdateCheckerEvent, UpdateService, UpdateSupport};
