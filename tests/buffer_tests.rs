//! Buffer behavior across threads and against a reference queue.
//!
//! Run with:
//! ```bash
//! cargo test -p event-monitor --test buffer_tests
//! ```

mod helpers;

use event_monitor::core::{HEADER_SIZE, MAX_EVENT_SIZE};
use event_monitor::prelude::*;
use event_monitor::{event_channel_with_capacity, EventConsumer};
use helpers::*;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn times(consumer: &mut EventConsumer) -> Vec<u32> {
    let mut out = Vec::new();
    while let Some(record) = consumer.pop() {
        out.push(record.time());
    }
    out
}

fn record(seq: u32) -> EventRecord {
    EventRecord::from_bytes(&patterned_event(seq, HEADER_SIZE + (seq as usize % 8))).unwrap()
}

#[test]
fn test_drop_oldest_keeps_latest_four() {
    let (mut producer, mut consumer) =
        event_channel_with_capacity(4, OverflowPolicy::DropOldest).unwrap();
    for seq in 0..5 {
        assert!(producer.push(record(seq)).is_stored());
    }
    assert_eq!(times(&mut consumer), [1, 2, 3, 4]);
    assert!(consumer.is_empty());
}

#[test]
fn test_drop_newest_keeps_first_four() {
    let (mut producer, mut consumer) =
        event_channel_with_capacity(4, OverflowPolicy::DropNewest).unwrap();
    for seq in 0..4 {
        assert_eq!(producer.push(record(seq)), PushOutcome::Stored);
    }
    assert_eq!(producer.push(record(4)), PushOutcome::Rejected);
    assert_eq!(times(&mut consumer), [0, 1, 2, 3]);
    assert_eq!(consumer.stats().rejected, 1);
}

#[test]
fn test_pop_on_empty_has_no_side_effects() {
    let (mut producer, mut consumer) =
        event_channel_with_capacity(2, OverflowPolicy::DropOldest).unwrap();
    for _ in 0..3 {
        assert!(consumer.pop().is_none());
    }
    assert!(consumer.is_empty());
    let _ = producer.push(record(9));
    assert_eq!(times(&mut consumer), [9]);
}

#[derive(Debug, Clone)]
enum Op {
    Push,
    Pop,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Push), Just(Op::Pop)]
}

fn policy() -> impl Strategy<Value = OverflowPolicy> {
    prop_oneof![Just(OverflowPolicy::DropOldest), Just(OverflowPolicy::DropNewest)]
}

proptest! {
    /// Single-threaded interleavings match a bounded reference queue.
    #[test]
    fn prop_matches_reference_queue(
        capacity_log2 in 1u32..6,
        policy in policy(),
        ops in prop::collection::vec(op(), 0..300),
    ) {
        let capacity = 1usize << capacity_log2;
        let (mut producer, mut consumer) = event_channel_with_capacity(capacity, policy).unwrap();
        let mut model = VecDeque::new();
        let mut next = 0u32;

        for op in ops {
            match op {
                Op::Push => {
                    let outcome = producer.push(record(next));
                    if model.len() < capacity {
                        prop_assert_eq!(outcome, PushOutcome::Stored);
                        model.push_back(next);
                    } else {
                        match policy {
                            OverflowPolicy::DropOldest => {
                                prop_assert_eq!(outcome, PushOutcome::Overwrote);
                                model.pop_front();
                                model.push_back(next);
                            }
                            OverflowPolicy::DropNewest => {
                                prop_assert_eq!(outcome, PushOutcome::Rejected);
                            }
                        }
                    }
                    next += 1;
                }
                Op::Pop => {
                    let got = consumer.pop();
                    prop_assert_eq!(got.map(|r| r.time()), model.pop_front());
                    if let Some(record) = got {
                        prop_assert!(verify_patterned(&record).is_ok());
                    }
                }
            }
            prop_assert_eq!(consumer.is_empty(), model.is_empty());
        }

        let rest = times(&mut consumer);
        prop_assert_eq!(rest, Vec::from(model));
    }
}

const STRESS_EVENTS: u32 = 200_000;

fn stress_len(seq: u32) -> usize {
    HEADER_SIZE + seq as usize % (MAX_EVENT_SIZE - HEADER_SIZE + 1)
}

/// Producer retries on rejection, so every event must arrive intact and in order.
#[test]
fn test_concurrent_lossless_delivery() {
    let (mut producer, mut consumer) =
        event_channel_with_capacity(64, OverflowPolicy::DropNewest).unwrap();

    let writer = thread::spawn(move || {
        for seq in 0..STRESS_EVENTS {
            let bytes = patterned_event(seq, stress_len(seq));
            loop {
                match producer.push_bytes(&bytes) {
                    Some(PushOutcome::Rejected) => thread::yield_now(),
                    Some(_) => break,
                    None => panic!("patterned event shorter than a header"),
                }
            }
        }
    });

    let mut expected = 0u32;
    while expected < STRESS_EVENTS {
        match consumer.pop() {
            Some(record) => {
                let seq = verify_patterned(&record).unwrap();
                assert_eq!(seq, expected, "out of order");
                assert_eq!(record.size() as usize, stress_len(seq));
                expected += 1;
            }
            None => thread::yield_now(),
        }
    }

    writer.join().unwrap();
    assert!(consumer.is_empty());
    assert_eq!(consumer.stats().pushed, STRESS_EVENTS as u64);
}

/// Under drop-oldest with a slow reader, records may vanish but never tear or reorder.
#[test]
fn test_concurrent_drop_oldest_never_tears() {
    let (mut producer, mut consumer) =
        event_channel_with_capacity(16, OverflowPolicy::DropOldest).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for seq in 0..STRESS_EVENTS {
                let _ = producer.push_bytes(&patterned_event(seq, stress_len(seq)));
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut received = 0u64;
    let mut last: Option<u32> = None;
    loop {
        let finished = done.load(Ordering::Acquire);
        match consumer.pop() {
            Some(record) => {
                let seq = verify_patterned(&record).unwrap();
                if let Some(prev) = last {
                    assert!(seq > prev, "seq {seq} after {prev}");
                }
                last = Some(seq);
                received += 1;
            }
            None if finished => break,
            None => thread::yield_now(),
        }
    }

    writer.join().unwrap();
    let stats = consumer.stats();
    assert_eq!(stats.pushed + stats.rejected, STRESS_EVENTS as u64);
    assert_eq!(received, stats.pushed - stats.overwritten);
}
