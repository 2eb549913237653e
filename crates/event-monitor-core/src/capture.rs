//! Audio-thread side: copy a host event batch into the buffer.
//!
//! Runs inside `process()`. Nothing here allocates, locks or logs.

use crate::buffer::{EventProducer, PushOutcome};
use crate::record::EventRecord;
use clap_sys::events::clap_input_events;

/// Per-batch tally of what happened to each event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// Events offered by the host.
    pub seen: u32,
    pub stored: u32,
    /// Stored after discarding an older unread record.
    pub overwritten: u32,
    pub rejected: u32,
    /// Stored with only their header because they exceeded the record size.
    pub truncated: u32,
    /// Null or shorter than a header; not pushed.
    pub invalid: u32,
}

impl CaptureReport {
    #[inline]
    fn record(&mut self, outcome: PushOutcome) {
        match outcome {
            PushOutcome::Stored => self.stored += 1,
            PushOutcome::Overwrote => {
                self.stored += 1;
                self.overwritten += 1;
            }
            PushOutcome::Rejected => self.rejected += 1,
        }
    }

    /// Events from this batch that will never reach the consumer.
    #[inline]
    pub fn lost(&self) -> u32 {
        self.rejected + self.invalid
    }
}

/// Push every event of a host input list, in list order.
///
/// # Safety
///
/// `events` must be null or a valid `clap_input_events` for the current
/// `process()` call, whose `get()` returns null or valid event headers.
pub unsafe fn capture_input_events(
    producer: &mut EventProducer,
    events: *const clap_input_events,
) -> CaptureReport {
    let mut report = CaptureReport::default();
    if events.is_null() {
        return report;
    }

    let list = &*events;
    let (Some(size), Some(get)) = (list.size, list.get) else {
        return report;
    };

    for index in 0..size(events) {
        report.seen += 1;
        let Some(record) = EventRecord::from_raw(get(events, index)) else {
            report.invalid += 1;
            continue;
        };
        if record.is_truncated() {
            report.truncated += 1;
        }
        report.record(producer.push(record));
    }

    report
}

/// Push already-copied records, in order.
pub fn capture_slice(producer: &mut EventProducer, records: &[EventRecord]) -> CaptureReport {
    let mut report = CaptureReport::default();
    for record in records {
        report.seen += 1;
        if record.is_truncated() {
            report.truncated += 1;
        }
        report.record(producer.push(*record));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::event_channel_with_capacity;
    use crate::config::OverflowPolicy;
    use crate::decode::NoteKind;
    use clap_sys::events::clap_event_header;
    use std::ffi::c_void;
    use std::ptr;

    /// Host-style input list over a vector of headers (null entries allowed).
    struct HostList {
        list: clap_input_events,
        _headers: Box<Vec<*const clap_event_header>>,
    }

    impl HostList {
        fn new(headers: Vec<*const clap_event_header>) -> Self {
            let headers = Box::new(headers);
            let list = clap_input_events {
                ctx: &*headers as *const Vec<*const clap_event_header> as *mut c_void,
                size: Some(host_size),
                get: Some(host_get),
            };
            Self {
                list,
                _headers: headers,
            }
        }
    }

    unsafe extern "C" fn host_size(list: *const clap_input_events) -> u32 {
        let headers = &*((*list).ctx as *const Vec<*const clap_event_header>);
        headers.len() as u32
    }

    unsafe extern "C" fn host_get(
        list: *const clap_input_events,
        index: u32,
    ) -> *const clap_event_header {
        let headers = &*((*list).ctx as *const Vec<*const clap_event_header>);
        headers.get(index as usize).copied().unwrap_or(ptr::null())
    }

    #[test]
    fn test_capture_input_list_in_order() {
        let events = [
            EventRecord::note(NoteKind::On, 0, 0, 0, 60, 1, 1.0),
            EventRecord::midi(10, 0, [0xb0, 7, 100]),
            EventRecord::note(NoteKind::Off, 20, 0, 0, 60, 1, 0.0),
        ];
        let host = HostList::new(events.iter().map(|e| e.view() as *const _).collect());
        let (mut producer, mut consumer) =
            event_channel_with_capacity(16, OverflowPolicy::DropOldest).unwrap();

        let report = unsafe { capture_input_events(&mut producer, &host.list) };
        assert_eq!(report.seen, 3);
        assert_eq!(report.stored, 3);
        assert_eq!(report.lost(), 0);

        for expected in &events {
            assert_eq!(consumer.pop().as_ref(), Some(expected));
        }
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_capture_counts_invalid_and_rejected() {
        let note = EventRecord::note(NoteKind::On, 0, 0, 0, 60, 1, 1.0);
        let host = HostList::new(vec![
            note.view() as *const _,
            ptr::null(),
            note.view() as *const _,
            note.view() as *const _,
        ]);
        let (mut producer, _consumer) =
            event_channel_with_capacity(2, OverflowPolicy::DropNewest).unwrap();

        let report = unsafe { capture_input_events(&mut producer, &host.list) };
        assert_eq!(report.seen, 4);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.stored, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.lost(), 2);
    }

    #[test]
    fn test_capture_null_list() {
        let (mut producer, consumer) =
            event_channel_with_capacity(2, OverflowPolicy::DropNewest).unwrap();
        let report = unsafe { capture_input_events(&mut producer, ptr::null()) };
        assert_eq!(report, CaptureReport::default());
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_capture_slice_reports_overwrites() {
        let records: Vec<_> = (0..6)
            .map(|t| EventRecord::midi(t, 0, [0x90, 60, 1]))
            .collect();
        let (mut producer, _consumer) =
            event_channel_with_capacity(4, OverflowPolicy::DropOldest).unwrap();
        let report = capture_slice(&mut producer, &records);
        assert_eq!(report.stored, 6);
        assert_eq!(report.overwritten, 2);
    }
}
