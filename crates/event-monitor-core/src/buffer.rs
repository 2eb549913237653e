//! Lock-free SPSC ring of [`EventRecord`]s.
//!
//! Audio thread → [`EventProducer::push`] → slot arena → [`EventConsumer::pop`] → UI thread.
//!
//! The arena is a fixed array of slots allocated once at construction. Two
//! monotonically increasing cursors (`tail` for writes, `head` for reads) map
//! into it through a power-of-two mask. Each slot carries a sequence stamp that
//! says whose turn it is:
//!
//! - `stamp == pos`: free, the producer may write position `pos`
//! - `stamp == pos + 1`: holds position `pos`, the consumer may read it
//!
//! After a read of `pos` the consumer stores `pos + capacity`, handing the slot
//! to the producer's next lap. Stamps are published with release and observed
//! with acquire, so a record is fully written before the consumer can see it
//! and fully read before the producer can reuse its slot.
//!
//! With [`OverflowPolicy::DropOldest`] the producer may also advance `head`: it
//! claims the oldest position with a compare-exchange, exactly like a read,
//! and then overwrites the slot without reading it. The consumer claims a
//! position the same way *before* copying the record out, so at most one side
//! ever touches a slot's contents. If the consumer wins that race the producer
//! does not wait for it; the new record is rejected instead.

use crate::config::{BufferConfig, OverflowPolicy};
use crate::record::EventRecord;
use crate::Result;
use std::cell::UnsafeCell;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Cache-line aligned wrapper, keeps the two cursors off each other's line.
#[repr(align(64))]
struct CacheAligned<T>(T);

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

struct Slot {
    stamp: AtomicUsize,
    record: UnsafeCell<EventRecord>,
}

/// Result of a [`EventProducer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Stored in a free slot.
    Stored,
    /// Stored after discarding the oldest unread record.
    Overwrote,
    /// Not stored; the buffer is unchanged.
    Rejected,
}

impl PushOutcome {
    /// Whether the pushed record will be seen by the consumer.
    #[inline]
    pub fn is_stored(self) -> bool {
        !matches!(self, PushOutcome::Rejected)
    }
}

/// Snapshot of the advisory buffer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Records made visible to the consumer.
    pub pushed: u64,
    /// Unread records discarded to make room (drop-oldest).
    pub overwritten: u64,
    /// Records refused because the buffer was full.
    pub rejected: u64,
}

impl BufferStats {
    /// Records lost to overflow, either way.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.overwritten + self.rejected
    }
}

#[derive(Default)]
struct Counters {
    pushed: AtomicU64,
    overwritten: AtomicU64,
    rejected: AtomicU64,
}

struct EventBuffer {
    head: CacheAligned<AtomicUsize>,
    tail: CacheAligned<AtomicUsize>,
    slots: Box<[Slot]>,
    mask: usize,
    policy: OverflowPolicy,
    counters: Counters,
}

// SAFETY: slot contents are only accessed by the side that currently owns the
// slot according to its stamp and the head claim protocol described above.
unsafe impl Sync for EventBuffer {}

impl EventBuffer {
    fn new(config: &BufferConfig) -> Result<Self> {
        config.validate()?;
        let capacity = config.slot_count();
        let slots = (0..capacity)
            .map(|i| Slot {
                stamp: AtomicUsize::new(i),
                record: UnsafeCell::new(EventRecord::default()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            head: CacheAligned(AtomicUsize::new(0)),
            tail: CacheAligned(AtomicUsize::new(0)),
            slots,
            mask: capacity - 1,
            policy: config.overflow,
            counters: Counters::default(),
        })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn slot(&self, pos: usize) -> &Slot {
        &self.slots[pos & self.mask]
    }

    /// Producer only.
    fn push(&self, record: EventRecord) -> PushOutcome {
        let tail = self.tail.load(Ordering::Relaxed);
        let slot = self.slot(tail);

        if slot.stamp.load(Ordering::Acquire) == tail {
            self.write(slot, tail, record);
            return PushOutcome::Stored;
        }

        // Full: the slot still holds position `tail - capacity`.
        let outcome = match self.policy {
            OverflowPolicy::DropNewest => PushOutcome::Rejected,
            OverflowPolicy::DropOldest => {
                let oldest = tail.wrapping_sub(self.capacity());
                if self
                    .head
                    .compare_exchange(
                        oldest,
                        oldest.wrapping_add(1),
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    self.write(slot, tail, record);
                    PushOutcome::Overwrote
                } else if slot.stamp.load(Ordering::Acquire) == tail {
                    // The consumer finished reading the slot in the meantime.
                    self.write(slot, tail, record);
                    PushOutcome::Stored
                } else {
                    PushOutcome::Rejected
                }
            }
        };

        match outcome {
            PushOutcome::Overwrote => {
                self.counters.overwritten.fetch_add(1, Ordering::Relaxed);
            }
            PushOutcome::Rejected => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            }
            PushOutcome::Stored => {}
        }
        outcome
    }

    #[inline]
    fn write(&self, slot: &Slot, pos: usize, record: EventRecord) {
        // SAFETY: the producer owns this slot: either its stamp marked it free
        // for `pos`, or the producer just claimed it away from the consumer.
        unsafe {
            *slot.record.get() = record;
        }
        let next = pos.wrapping_add(1);
        slot.stamp.store(next, Ordering::Release);
        self.tail.store(next, Ordering::Release);
        self.counters.pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Consumer only.
    fn pop(&self) -> Option<EventRecord> {
        loop {
            let head = self.head.load(Ordering::Acquire);
            let slot = self.slot(head);
            let stamp = slot.stamp.load(Ordering::Acquire);

            if stamp == head {
                return None;
            }
            if stamp != head.wrapping_add(1) {
                // The producer dropped the oldest record under us; reload head.
                continue;
            }
            if !self.claim(head) {
                continue;
            }

            // SAFETY: the slot is filled for `head` and this side won the claim.
            let record = unsafe { *slot.record.get() };
            slot.stamp
                .store(head.wrapping_add(self.capacity()), Ordering::Release);
            return Some(record);
        }
    }

    #[inline]
    fn claim(&self, head: usize) -> bool {
        let next = head.wrapping_add(1);
        match self.policy {
            OverflowPolicy::DropNewest => {
                self.head.store(next, Ordering::Release);
                true
            }
            OverflowPolicy::DropOldest => self
                .head
                .compare_exchange(head, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
        }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        let tail = self.tail.load(Ordering::Acquire);
        self.head.load(Ordering::Acquire) == tail
    }

    /// Racy snapshot.
    #[inline]
    fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head).min(self.capacity())
    }

    fn stats(&self) -> BufferStats {
        BufferStats {
            pushed: self.counters.pushed.load(Ordering::Relaxed),
            overwritten: self.counters.overwritten.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Write half, owned by the audio thread.
///
/// `push` never blocks, never allocates and never fails loudly.
pub struct EventProducer {
    buffer: Arc<EventBuffer>,
}

impl EventProducer {
    /// Push a record, resolving overflow with the configured policy.
    #[inline]
    pub fn push(&mut self, record: EventRecord) -> PushOutcome {
        self.buffer.push(record)
    }

    /// Push a record copied from serialized bytes.
    ///
    /// Returns `None` when the bytes are too short to form a record.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Option<PushOutcome> {
        EventRecord::from_bytes(bytes).map(|record| self.push(record))
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    #[inline]
    pub fn policy(&self) -> OverflowPolicy {
        self.buffer.policy
    }

    pub fn stats(&self) -> BufferStats {
        self.buffer.stats()
    }
}

/// Read half, owned by the UI/polling thread.
pub struct EventConsumer {
    buffer: Arc<EventBuffer>,
}

impl EventConsumer {
    /// Remove and return the oldest record, if any.
    #[inline]
    pub fn pop(&mut self) -> Option<EventRecord> {
        self.buffer.pop()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Advisory occupancy. May be stale by the time it is returned.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    #[inline]
    pub fn policy(&self) -> OverflowPolicy {
        self.buffer.policy
    }

    pub fn stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    /// Pop until empty, handing records to `sink` oldest first.
    ///
    /// Stops after one buffer's worth so a fast producer cannot keep the
    /// caller here forever.
    pub fn drain_into<E: Extend<EventRecord>>(&mut self, sink: &mut E) -> usize {
        let limit = self.capacity();
        let mut count = 0;
        while count < limit {
            match self.pop() {
                Some(record) => {
                    sink.extend(std::iter::once(record));
                    count += 1;
                }
                None => break,
            }
        }
        count
    }
}

impl std::fmt::Debug for EventProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProducer")
            .field("capacity", &self.capacity())
            .field("policy", &self.policy())
            .finish()
    }
}

impl std::fmt::Debug for EventConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConsumer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

/// Create a producer/consumer pair over a new buffer.
pub fn event_channel(config: &BufferConfig) -> Result<(EventProducer, EventConsumer)> {
    let buffer = Arc::new(EventBuffer::new(config)?);
    Ok((
        EventProducer {
            buffer: Arc::clone(&buffer),
        },
        EventConsumer { buffer },
    ))
}

/// Create a producer/consumer pair with the given capacity and policy.
pub fn event_channel_with_capacity(
    capacity: usize,
    overflow: OverflowPolicy,
) -> Result<(EventProducer, EventConsumer)> {
    event_channel(&BufferConfig::new(capacity, overflow))
}
