//! Adhera — a local-first medication adherence engine.
//!
//! Derives per-day dose schedules from medication definitions, tracks
//! taken/untaken state with an append-only history, and evaluates
//! time-windowed dose and refill reminders on a periodic loop. Rendering
//! (forms, toasts, pages) and the notification display channel belong to
//! the embedding application; this crate decides *what* to notify and
//! *when*.
//!
//! Entry point for embedders is [`service::MedicationService`] over a
//! [`db::CollectionStore`] implementation ([`db::SqliteStore`] for a
//! durable file, [`db::MemoryStore`] for prototypes and tests) and a
//! [`notify::NotificationChannel`].

pub mod adherence;
pub mod config;
pub mod consistency;
pub mod db;
pub mod medications;
pub mod models;
pub mod notify;
pub mod reminders;
pub mod schedule;
pub mod scheduler;
pub mod service;

pub use adherence::{HistoryCard, HistoryFilter};
pub use db::{CollectionStore, MemoryStore, SqliteStore, StoreError};
pub use medications::MedicationError;
pub use models::{DoseSlot, Frequency, HistoryEntry, Medication, MedicationInput};
pub use notify::{LogNotifier, NotificationChannel, Severity};
pub use reminders::ReminderEvent;
pub use scheduler::ReminderConfig;
pub use service::MedicationService;
