//! Bounded history of received records, newest first.

use crate::table::EventRow;
use crate::{Error, Result, MAX_HISTORY};
use event_monitor_core::{BufferStats, EventConsumer, EventRecord};
use ringbuf::{traits::*, HeapRb};

/// Records drained from an [`EventConsumer`], kept for display.
///
/// Holds at most `history_len` records; older ones fall off as new ones arrive.
pub struct EventLog {
    history: HeapRb<EventRecord>,
    last_stats: BufferStats,
    total_received: u64,
}

impl EventLog {
    pub fn new(history_len: usize) -> Result<Self> {
        if history_len == 0 || history_len > MAX_HISTORY {
            return Err(Error::InvalidHistoryLength(history_len));
        }
        Ok(Self {
            history: HeapRb::new(history_len),
            last_stats: BufferStats::default(),
            total_received: 0,
        })
    }

    /// Drain the consumer into the log. Returns the number of new rows.
    ///
    /// Pops until the buffer reports empty, or until one buffer's worth has
    /// been taken so a busy producer cannot pin the caller.
    pub fn poll(&mut self, consumer: &mut EventConsumer) -> usize {
        let limit = consumer.capacity();
        let mut received = 0;
        while received < limit && !consumer.is_empty() {
            match consumer.pop() {
                Some(record) => {
                    self.history.push_overwrite(record);
                    received += 1;
                }
                None => break,
            }
        }
        self.total_received += received as u64;

        let stats = consumer.stats();
        if stats.dropped() > self.last_stats.dropped() {
            tracing::warn!(
                "Event buffer overflowed: {} overwritten, {} rejected since last poll",
                stats.overwritten.saturating_sub(self.last_stats.overwritten),
                stats.rejected.saturating_sub(self.last_stats.rejected)
            );
        }
        self.last_stats = stats;

        received
    }

    /// Append records directly, oldest first.
    pub fn extend_from_slice(&mut self, records: &[EventRecord]) {
        for record in records {
            self.history.push_overwrite(*record);
        }
        self.total_received += records.len() as u64;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.capacity().get()
    }

    /// Records received over the log's lifetime, including ones since evicted.
    #[inline]
    pub fn total_received(&self) -> u64 {
        self.total_received
    }

    /// Buffer counters as of the last poll.
    #[inline]
    pub fn last_stats(&self) -> BufferStats {
        self.last_stats
    }

    /// Records, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        let (older, newer) = self.history.as_slices();
        newer.iter().rev().chain(older.iter().rev())
    }

    /// Row `index`, counting from the newest record.
    pub fn row(&self, index: usize) -> Option<EventRow> {
        let len = self.len();
        if index >= len {
            return None;
        }
        let (older, newer) = self.history.as_slices();
        let position = len - 1 - index;
        let record = if position < older.len() {
            older[position]
        } else {
            newer[position - older.len()]
        };
        Some(EventRow { index, record })
    }

    /// All rows, newest first.
    pub fn rows(&self) -> impl Iterator<Item = EventRow> + '_ {
        self.iter()
            .enumerate()
            .map(|(index, record)| EventRow {
                index,
                record: *record,
            })
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .field("history_len", &self.history_len())
            .field("total_received", &self.total_received)
            .finish()
    }
}
