//! Event buffer configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted buffer capacity, in records.
pub const MAX_CAPACITY: usize = 1 << 20;

/// What `push` does when the buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Discard the oldest unread record to make room for the new one.
    #[default]
    DropOldest,
    /// Keep the buffer as is and reject the new record.
    DropNewest,
}

/// Configuration for the cross-thread event buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Requested capacity. Rounded up to a power of two, minimum 2.
    pub capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            overflow: OverflowPolicy::DropOldest,
        }
    }
}

impl BufferConfig {
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self { capacity, overflow }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig(
                "buffer capacity must be non-zero".to_string(),
            ));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "buffer capacity {} exceeds maximum of {}",
                self.capacity, MAX_CAPACITY
            )));
        }
        Ok(())
    }

    /// Number of slots actually allocated.
    pub fn slot_count(&self) -> usize {
        self.capacity.max(2).next_power_of_two()
    }
}
