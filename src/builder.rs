//! Builder for configuring and constructing an `EventMonitor`.

use crate::config::MonitorConfig;
use crate::{EventMonitor, Result};
use event_monitor_core::OverflowPolicy;
use std::time::Duration;

/// # Example
///
/// ```ignore
/// use event_monitor::prelude::*;
///
/// let monitor = EventMonitor::builder()
///     .capacity(1024)
///     .overflow(OverflowPolicy::DropNewest)
///     .history_len(2000)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventMonitorBuilder {
    config: MonitorConfig,
}

impl EventMonitorBuilder {
    /// Start from an existing config (e.g. one deserialized from disk).
    pub fn from_config(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Default: 4096. Rounded up to a power of two.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.buffer.capacity = capacity;
        self
    }

    /// Default: [`OverflowPolicy::DropOldest`]
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.config.buffer.overflow = policy;
        self
    }

    /// Default: 4096
    pub fn history_len(mut self, len: usize) -> Self {
        self.config.history_len = len;
        self
    }

    /// Default: 50 ms. Sub-millisecond precision is dropped.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn build(self) -> Result<EventMonitor> {
        self.config.validate()?;
        Ok(EventMonitor::from_config_unchecked(self.config))
    }
}
