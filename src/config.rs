//! Monitor configuration.

use crate::{Error, Result};
use event_monitor_core::BufferConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted poll interval.
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;

/// Configuration for one monitor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Audio → UI buffer.
    pub buffer: BufferConfig,
    /// Records kept for display.
    pub history_len: usize,
    /// UI poll cadence.
    pub poll_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buffer: BufferConfig::default(),
            history_len: 4096,
            poll_interval_ms: 50,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        self.buffer.validate()?;
        if self.history_len == 0 || self.history_len > event_monitor_ui::MAX_HISTORY {
            return Err(event_monitor_ui::Error::InvalidHistoryLength(self.history_len).into());
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(Error::InvalidConfig(format!(
                "poll_interval_ms {} out of range (1-{})",
                self.poll_interval_ms, MAX_POLL_INTERVAL_MS
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
