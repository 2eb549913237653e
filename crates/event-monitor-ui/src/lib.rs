//! Consumer side of the event monitor.
//!
//! - [`EventLog`]: bounded, newest-first history filled by draining an `EventConsumer`
//! - [`Column`] / [`EventRow`]: table model (Space, Time, Type, Size, Information)
//! - [`EventPoller`]: background thread that polls on a timer into a shared log
//!
//! Rendering is left to whatever toolkit hosts the editor; this crate only
//! produces the cell text.

pub mod error;
pub use error::{Error, Result};

mod log;
pub use log::EventLog;

mod table;
pub use table::{Column, EventRow};

mod poller;
pub use poller::EventPoller;

/// Largest accepted history length, in records.
pub const MAX_HISTORY: usize = 1 << 20;
