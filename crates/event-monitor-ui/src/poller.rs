//! Timer-driven consumer thread.
//!
//! Poller thread → `EventLog::poll` on a fixed interval → shared log read by the UI.

use crate::log::EventLog;
use crate::Result;
use event_monitor_core::EventConsumer;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Background thread that drains an [`EventConsumer`] into a shared [`EventLog`].
///
/// Stops and joins when dropped. Use [`EventPoller::stop`] to get the consumer back.
pub struct EventPoller {
    log: Arc<Mutex<EventLog>>,
    running: Arc<AtomicBool>,
    updates: Arc<AtomicU64>,
    thread_handle: Option<thread::JoinHandle<EventConsumer>>,
}

impl EventPoller {
    pub fn spawn(
        consumer: EventConsumer,
        log: Arc<Mutex<EventLog>>,
        interval: Duration,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let updates = Arc::new(AtomicU64::new(0));

        let thread_handle = {
            let log = Arc::clone(&log);
            let running = Arc::clone(&running);
            let updates = Arc::clone(&updates);
            thread::Builder::new()
                .name("event-monitor-poll".to_string())
                .spawn(move || Self::poll_loop(consumer, log, running, updates, interval))?
        };

        tracing::debug!("Started event poller ({} ms interval)", interval.as_millis());

        Ok(Self {
            log,
            running,
            updates,
            thread_handle: Some(thread_handle),
        })
    }

    fn poll_loop(
        mut consumer: EventConsumer,
        log: Arc<Mutex<EventLog>>,
        running: Arc<AtomicBool>,
        updates: Arc<AtomicU64>,
        interval: Duration,
    ) -> EventConsumer {
        while running.load(Ordering::Acquire) {
            if log.lock().poll(&mut consumer) > 0 {
                updates.fetch_add(1, Ordering::Release);
            }
            thread::park_timeout(interval);
        }
        // Pick up whatever arrived between the last tick and the stop request.
        if log.lock().poll(&mut consumer) > 0 {
            updates.fetch_add(1, Ordering::Release);
        }
        consumer
    }

    /// The shared log the poller writes into.
    pub fn log(&self) -> &Arc<Mutex<EventLog>> {
        &self.log
    }

    /// Number of polls that delivered at least one row. A UI repaints when this changes.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the thread and hand the consumer back.
    ///
    /// Returns `None` if the poller thread panicked.
    pub fn stop(mut self) -> Option<EventConsumer> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<EventConsumer> {
        let handle = self.thread_handle.take()?;
        self.running.store(false, Ordering::Release);
        handle.thread().unpark();
        match handle.join() {
            Ok(consumer) => {
                tracing::debug!("Stopped event poller");
                Some(consumer)
            }
            Err(_) => {
                tracing::warn!("Event poller thread panicked");
                None
            }
        }
    }
}

impl Drop for EventPoller {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
