//! Reminder scheduler loop — periodic evaluation on a background thread.
//!
//! Activation runs one evaluation immediately, then arms a fixed-cadence
//! timer. Every event from a cycle is forwarded to the notification
//! channel as produced: no batching and no de-duplication across cycles,
//! so an unacknowledged overdue dose re-notifies every cycle until taken
//! or past the overdue cap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use crate::db::CollectionStore;
use crate::notify::NotificationChannel;
use crate::reminders::evaluate_reminders;

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Evaluation cadence in milliseconds.
    pub interval_ms: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { interval_ms: 60_000 }
    }
}

/// Handle for the reminder scheduler thread.
///
/// The timer is an owned resource: it lives exactly as long as this
/// handle. Supports graceful shutdown via `shutdown()` or automatic
/// cleanup on `Drop` (signal then join).
pub struct ReminderScheduler {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl ReminderScheduler {
    /// Request graceful shutdown. An in-flight evaluation completes, but
    /// no further cycles run.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the reminder scheduler: one immediate evaluation on the calling
/// thread, then a periodic loop on a background thread. The loop holds no
/// state beyond the shutdown flag; medication and slot state is re-read
/// fresh from the store on every firing.
pub fn start_reminder_scheduler(
    store: Arc<dyn CollectionStore>,
    notifier: Arc<dyn NotificationChannel>,
    config: ReminderConfig,
) -> ReminderScheduler {
    run_cycle(store.as_ref(), notifier.as_ref());

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let interval_ms = config.interval_ms;

    let handle = std::thread::spawn(move || {
        tracing::info!(interval_ms, "Reminder scheduler started");
        scheduler_loop(store.as_ref(), notifier.as_ref(), &flag, interval_ms);
        tracing::info!("Reminder scheduler stopped");
    });

    ReminderScheduler {
        shutdown,
        handle: Some(handle),
    }
}

fn scheduler_loop(
    store: &dyn CollectionStore,
    notifier: &dyn NotificationChannel,
    shutdown: &AtomicBool,
    interval_ms: u64,
) {
    while !shutdown.load(Ordering::Relaxed) {
        // Sleep in small increments for responsive shutdown
        let mut remaining = interval_ms;
        while remaining > 0 {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            let step = remaining.min(SLEEP_GRANULARITY_MS);
            std::thread::sleep(Duration::from_millis(step));
            remaining -= step;
        }

        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        run_cycle(store, notifier);
    }
}

/// One evaluation cycle. Errors are logged and the loop continues; a
/// transient store failure must not kill the timer.
fn run_cycle(store: &dyn CollectionStore, notifier: &dyn NotificationChannel) {
    let now = Local::now().naive_local();
    match evaluate_reminders(store, now) {
        Ok(events) => {
            for event in events {
                notifier.notify(event.title(), &event.description(), event.severity());
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Reminder evaluation cycle failed");
        }
    }
}
