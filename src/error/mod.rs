//! Error handling using `thiserror` and `anyhow`.
//!
//! This module provides domain-specific error types for precise handling and
//! operational helpers for context propagation and centralized reporting.

pub mod domain;
pub mod operational;

pub use {
    domain::{Result, UiError},
    operational::{ErrorReporter, ResultExt},
};
