//! Error types for event-monitor-core.

use thiserror::Error;

/// Error type for event-monitor-core operations.
///
/// Only construction can fail. Pushing, popping and decoding never return
/// errors; they report through outcome enums and fallback payloads.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
