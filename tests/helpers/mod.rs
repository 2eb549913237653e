//! Shared fixtures for event-monitor integration tests.
//!
//! - serialized events with a verifiable byte pattern
//! - a fake host `clap_input_events` list
//! - ready-made monitors

#![allow(dead_code)]

use event_monitor::core::clap_sys::events::{
    clap_event_header, clap_input_events, CLAP_CORE_EVENT_SPACE_ID,
};
use event_monitor::core::HEADER_SIZE;
use event_monitor::prelude::*;
use std::ffi::c_void;
use std::ptr;

/// Event type used for synthetic payloads. Not a core type, so decoding falls back.
pub const PATTERN_EVENT_TYPE: u16 = 0x7ff0;

/// Space id outside the core space.
pub const FOREIGN_SPACE_ID: u16 = 0x4242;

/// Build a monitor for tests with an explicit capacity and policy.
pub fn test_monitor(capacity: usize, policy: OverflowPolicy) -> EventMonitor {
    EventMonitor::builder()
        .capacity(capacity)
        .overflow(policy)
        .history_len(capacity.max(1) * 4)
        .build()
        .expect("test monitor config is valid")
}

/// Expected payload byte at `offset` for sequence number `seq`.
#[inline]
pub fn pattern_byte(seq: u32, offset: usize) -> u8 {
    (seq as u8).wrapping_mul(31).wrapping_add(offset as u8)
}

/// Serialized event of exactly `len` bytes (clamped to at least a header).
///
/// `time` carries the sequence number; payload bytes follow [`pattern_byte`].
pub fn patterned_event(seq: u32, len: usize) -> Vec<u8> {
    let len = len.max(HEADER_SIZE);
    let mut bytes = vec![0u8; len];
    write_header(
        &mut bytes,
        &clap_event_header {
            size: len as u32,
            time: seq,
            space_id: CLAP_CORE_EVENT_SPACE_ID,
            type_: PATTERN_EVENT_TYPE,
            flags: 0,
        },
    );
    for (offset, byte) in bytes.iter_mut().enumerate().skip(HEADER_SIZE) {
        *byte = pattern_byte(seq, offset);
    }
    bytes
}

/// Check that a received record is exactly one of the patterned events.
pub fn verify_patterned(record: &EventRecord) -> std::result::Result<u32, String> {
    let seq = record.time();
    let bytes = record.as_bytes();
    if bytes.len() != record.size() as usize {
        return Err(format!("seq {seq}: stored {} bytes, size says {}", bytes.len(), record.size()));
    }
    if record.event_type() != PATTERN_EVENT_TYPE {
        return Err(format!("seq {seq}: type {:#x}", record.event_type()));
    }
    for (offset, byte) in bytes.iter().enumerate().skip(HEADER_SIZE) {
        if *byte != pattern_byte(seq, offset) {
            return Err(format!("seq {seq}: torn payload at byte {offset}"));
        }
    }
    Ok(seq)
}

fn write_header(bytes: &mut [u8], header: &clap_event_header) {
    bytes[0..4].copy_from_slice(&header.size.to_ne_bytes());
    bytes[4..8].copy_from_slice(&header.time.to_ne_bytes());
    bytes[8..10].copy_from_slice(&header.space_id.to_ne_bytes());
    bytes[10..12].copy_from_slice(&header.type_.to_ne_bytes());
    bytes[12..16].copy_from_slice(&header.flags.to_ne_bytes());
}

/// Header-only event in an arbitrary space.
pub fn foreign_event(time: u32, event_type: u16) -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_SIZE];
    write_header(
        &mut bytes,
        &clap_event_header {
            size: HEADER_SIZE as u32,
            time,
            space_id: FOREIGN_SPACE_ID,
            type_: event_type,
            flags: 0,
        },
    );
    bytes
}

/// An input event list the way a host hands one to `process()`.
///
/// Owns 8-aligned copies of each event so the header pointers stay valid.
pub struct FakeHostEvents {
    list: clap_input_events,
    _storage: Box<Vec<Vec<u64>>>,
    headers: Box<Vec<*const clap_event_header>>,
}

impl FakeHostEvents {
    pub fn new<I, B>(events: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let storage: Box<Vec<Vec<u64>>> = Box::new(
            events
                .into_iter()
                .map(|event| {
                    let event = event.as_ref();
                    let mut words = vec![0u64; event.len().div_ceil(8)];
                    // SAFETY: `words` spans at least `event.len()` bytes.
                    unsafe {
                        ptr::copy_nonoverlapping(
                            event.as_ptr(),
                            words.as_mut_ptr() as *mut u8,
                            event.len(),
                        );
                    }
                    words
                })
                .collect(),
        );
        let headers: Box<Vec<*const clap_event_header>> = Box::new(
            storage
                .iter()
                .map(|words| words.as_ptr() as *const clap_event_header)
                .collect(),
        );
        let list = clap_input_events {
            ctx: &*headers as *const Vec<*const clap_event_header> as *mut c_void,
            size: Some(list_size),
            get: Some(list_get),
        };
        Self {
            list,
            _storage: storage,
            headers,
        }
    }

    /// Also hand out a null entry at the end, as a misbehaving host might.
    pub fn with_null_entry(mut self) -> Self {
        self.headers.push(ptr::null());
        self
    }

    pub fn as_ptr(&self) -> *const clap_input_events {
        &self.list
    }
}

unsafe extern "C" fn list_size(list: *const clap_input_events) -> u32 {
    let headers = &*((*list).ctx as *const Vec<*const clap_event_header>);
    headers.len() as u32
}

unsafe extern "C" fn list_get(list: *const clap_input_events, index: u32) -> *const clap_event_header {
    let headers = &*((*list).ctx as *const Vec<*const clap_event_header>);
    headers.get(index as usize).copied().unwrap_or(ptr::null())
}
