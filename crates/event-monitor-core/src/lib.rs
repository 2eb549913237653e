//! Lock-free transport of CLAP event records off the audio thread.
//!
//! # Primary API
//!
//! - [`EventRecord`]: owned, fixed-capacity copy of one host event
//! - [`EventPayload`] / [`text_summary`]: decoding of a record by `(space, type)`
//! - [`event_channel`]: SPSC buffer split into [`EventProducer`] / [`EventConsumer`]
//! - [`capture_input_events`]: push a host `clap_input_events` batch from `process()`
//!
//! # Example
//!
//! ```ignore
//! use event_monitor_core::{event_channel, BufferConfig, EventRecord, NoteKind};
//!
//! let (mut producer, mut consumer) = event_channel(&BufferConfig::default())?;
//!
//! // audio thread
//! producer.push(EventRecord::note(NoteKind::On, 0, 0, 0, 60, -1, 1.0));
//!
//! // UI thread
//! while let Some(record) = consumer.pop() {
//!     println!("{}", event_monitor_core::text_summary(&record));
//! }
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::{BufferConfig, OverflowPolicy, MAX_CAPACITY};

mod record;
pub use record::{core_header, CoreEvent, EventRecord, HEADER_SIZE, MAX_EVENT_SIZE};

mod decode;
pub use decode::{
    event_type_name, text_summary, EventPayload, NoteExpressionKind, NoteKind, TransportInfo,
    NON_CORE_SUMMARY, UNDECODED_SUMMARY,
};

mod buffer;
pub use buffer::{
    event_channel, event_channel_with_capacity, BufferStats, EventConsumer, EventProducer,
    PushOutcome,
};

mod capture;
pub use capture::{capture_input_events, capture_slice, CaptureReport};

/// Re-export of the CLAP ABI bindings the record layout is built on.
pub use clap_sys;
