//! Centralized error type for the event-monitor umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] event_monitor_core::Error),

    #[error(transparent)]
    Ui(#[from] event_monitor_ui::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
