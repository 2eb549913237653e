//! Monitor lifecycle: configure once, activate into an audio half and a UI half.

use crate::builder::EventMonitorBuilder;
use crate::config::MonitorConfig;
use crate::Result;
use event_monitor_core::{
    capture_input_events, capture_slice, clap_sys::events::clap_input_events, event_channel,
    BufferStats, CaptureReport, EventConsumer, EventProducer, EventRecord, PushOutcome,
};
use event_monitor_ui::{EventLog, EventPoller, EventRow};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A configured but inactive monitor.
///
/// Each call to [`activate`](Self::activate) allocates a fresh buffer, the
/// way a plugin reallocates on every `activate()`.
#[derive(Debug, Clone)]
pub struct EventMonitor {
    config: MonitorConfig,
}

impl EventMonitor {
    pub fn builder() -> EventMonitorBuilder {
        EventMonitorBuilder::default()
    }

    pub fn from_config(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub(crate) fn from_config_unchecked(config: MonitorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Allocate the buffer and history and split them between the two threads.
    pub fn activate(&self) -> Result<(AudioSide, UiSide)> {
        let (producer, consumer) = event_channel(&self.config.buffer)?;
        let log = EventLog::new(self.config.history_len)?;

        tracing::info!(
            "Event monitor activated: {} slots ({:?}), {} rows of history",
            producer.capacity(),
            producer.policy(),
            self.config.history_len
        );

        Ok((
            AudioSide { producer },
            UiSide {
                consumer,
                log,
                poll_interval: self.config.poll_interval(),
            },
        ))
    }
}

/// Producer half, owned by the audio thread.
///
/// Wait-free; never logs or allocates.
#[derive(Debug)]
pub struct AudioSide {
    producer: EventProducer,
}

impl AudioSide {
    /// Copy every event of the host's input list into the buffer.
    ///
    /// # Safety
    ///
    /// Same contract as [`capture_input_events`]: `events` must be null or
    /// the list passed to the current `process()` call.
    #[inline]
    pub unsafe fn capture(&mut self, events: *const clap_input_events) -> CaptureReport {
        capture_input_events(&mut self.producer, events)
    }

    #[inline]
    pub fn capture_records(&mut self, records: &[EventRecord]) -> CaptureReport {
        capture_slice(&mut self.producer, records)
    }

    #[inline]
    pub fn push(&mut self, record: EventRecord) -> PushOutcome {
        self.producer.push(record)
    }

    #[inline]
    pub fn stats(&self) -> BufferStats {
        self.producer.stats()
    }

    pub fn producer(&mut self) -> &mut EventProducer {
        &mut self.producer
    }
}

/// Consumer half plus display history, owned by the UI thread.
#[derive(Debug)]
pub struct UiSide {
    consumer: EventConsumer,
    log: EventLog,
    poll_interval: Duration,
}

impl UiSide {
    /// Drain pending records into the history. Returns the number received.
    pub fn poll(&mut self) -> usize {
        self.log.poll(&mut self.consumer)
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Row `index`, counting from the newest record.
    pub fn row(&self, index: usize) -> Option<EventRow> {
        self.log.row(index)
    }

    pub fn rows(&self) -> impl Iterator<Item = EventRow> + '_ {
        self.log.rows()
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn stats(&self) -> BufferStats {
        self.consumer.stats()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Hand the consumer and history to a background poller thread.
    pub fn into_poller(self) -> Result<EventPoller> {
        let log = Arc::new(Mutex::new(self.log));
        Ok(EventPoller::spawn(self.consumer, log, self.poll_interval)?)
    }
}
