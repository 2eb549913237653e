//! # event-monitor
//!
//! Capture CLAP events on the audio thread and display them on the UI thread.
//!
//! ## Architecture
//!
//! ```text
//! process() ──capture──▶ AudioSide ══ lock-free ring ══▶ UiSide ──poll──▶ EventLog ──▶ table rows
//! ```
//!
//! - **event-monitor-core** - event records, decoding, the SPSC buffer, batch capture
//! - **event-monitor-ui** - bounded history, table model, background poller
//!
//! ## Quick Start
//!
//! ```ignore
//! use event_monitor::prelude::*;
//!
//! let monitor = EventMonitor::builder()
//!     .capacity(4096)
//!     .overflow(OverflowPolicy::DropOldest)
//!     .build()?;
//!
//! // plugin activate()
//! let (mut audio, mut ui) = monitor.activate()?;
//!
//! // process(), audio thread
//! unsafe { audio.capture(process.in_events) };
//!
//! // editor timer, UI thread
//! ui.poll();
//! for row in ui.rows() {
//!     println!("{}", row.cell(Column::Information));
//! }
//! ```

/// Re-export of event-monitor-core for direct access
pub use event_monitor_core as core;
/// Re-export of event-monitor-ui for direct access
pub use event_monitor_ui as ui;

pub use event_monitor_core::{
    event_channel, event_channel_with_capacity, event_type_name, text_summary, BufferConfig,
    BufferStats, CaptureReport, EventConsumer, EventPayload, EventProducer, EventRecord,
    OverflowPolicy, PushOutcome, MAX_EVENT_SIZE,
};
pub use event_monitor_ui::{Column, EventLog, EventPoller, EventRow};

mod builder;
mod config;
mod error;
mod monitor;

pub use builder::EventMonitorBuilder;
pub use config::{MonitorConfig, MAX_POLL_INTERVAL_MS};
pub use error::{Error, Result};
pub use monitor::{AudioSide, EventMonitor, UiSide};

/// Common imports.
pub mod prelude {
    pub use crate::{
        AudioSide, BufferStats, CaptureReport, Column, EventMonitor, EventPayload, EventRecord,
        EventRow, MonitorConfig, OverflowPolicy, PushOutcome, UiSide,
    };
    pub use crate::{Error, Result};
}
