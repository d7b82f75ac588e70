//! Reminder evaluation: classify every dose slot and refill date against
//! a given instant into zero or one notifiable condition.
//!
//! Events are produced fresh each cycle and never persisted; ordering
//! within a cycle is an implementation detail consumers must not rely on.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, load_collection, CollectionStore};
use crate::medications::{self, MedicationError};
use crate::models::{DoseSlot, Medication};
use crate::notify::Severity;

/// Lookahead for upcoming-dose notifications, in hours.
const UPCOMING_WINDOW_HOURS: i64 = 1;

/// Overdue notifications stop after this many hours of lateness. Bounds
/// notification volume for long-stale slots; not a clinical cutoff.
const OVERDUE_CAP_HOURS: i64 = 12;

/// Lookahead for refill notifications, in days.
const REFILL_WINDOW_DAYS: i64 = 7;

/// A transient notifiable condition. A slot yields at most one of
/// `UpcomingDose`/`OverdueDose` per evaluation; a medication may yield a
/// dose event and a refill event in the same cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReminderEvent {
    UpcomingDose {
        medication_id: Uuid,
        name: String,
        dosage: String,
        slot_id: Uuid,
        time: NaiveTime,
        minutes_until: i64,
    },
    OverdueDose {
        medication_id: Uuid,
        name: String,
        dosage: String,
        slot_id: Uuid,
        time: NaiveTime,
        minutes_overdue: i64,
    },
    RefillDue {
        medication_id: Uuid,
        name: String,
        days_until: i64,
    },
}

impl ReminderEvent {
    pub fn title(&self) -> &'static str {
        match self {
            ReminderEvent::UpcomingDose { .. } => "Upcoming Medication",
            ReminderEvent::OverdueDose { .. } => "Medication Overdue",
            ReminderEvent::RefillDue { .. } => "Medication Refill Reminder",
        }
    }

    pub fn description(&self) -> String {
        match self {
            ReminderEvent::UpcomingDose { name, dosage, minutes_until, .. } => {
                format!("{name} ({dosage}) due in {minutes_until} minutes")
            }
            ReminderEvent::OverdueDose { name, dosage, minutes_overdue, .. } => {
                format!("{name} ({dosage}) was due {minutes_overdue} minutes ago")
            }
            ReminderEvent::RefillDue { name, days_until, .. } => {
                format!("{name} needs to be refilled in {days_until} days")
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ReminderEvent::OverdueDose { .. } => Severity::Destructive,
            _ => Severity::Normal,
        }
    }
}

/// Dose slots belonging to medications whose active window covers `today`.
pub fn today_dose_slots(
    store: &dyn CollectionStore,
    today: NaiveDate,
) -> Result<Vec<DoseSlot>, MedicationError> {
    let medications = medications::list_medications(store)?;
    let by_id: HashMap<Uuid, &Medication> = medications.iter().map(|m| (m.id, m)).collect();

    let slots: Vec<DoseSlot> = load_collection(store, db::MEDICATION_SCHEDULE)?;
    Ok(slots
        .into_iter()
        .filter(|s| by_id.get(&s.medication_id).is_some_and(|m| m.is_active_on(today)))
        .collect())
}

/// Evaluate every slot and refill date against `now`.
///
/// For a slot's reminder instant `ri` (today's date at the slot's time),
/// an untaken slot is upcoming when `now < ri ≤ now + 1h` and overdue
/// when `ri < now < ri + 12h`; exactly at `ri` it is neither. Refills
/// fire when `now < refill_date ≤ now + 7d` for medications with the
/// refill-reminder flag set.
pub fn evaluate_reminders(
    store: &dyn CollectionStore,
    now: NaiveDateTime,
) -> Result<Vec<ReminderEvent>, MedicationError> {
    let today = now.date();
    let medications = medications::list_medications(store)?;
    let by_id: HashMap<Uuid, &Medication> = medications.iter().map(|m| (m.id, m)).collect();

    let slots: Vec<DoseSlot> = load_collection(store, db::MEDICATION_SCHEDULE)?;
    let mut events = Vec::new();

    for slot in &slots {
        let Some(medication) = by_id.get(&slot.medication_id) else {
            continue;
        };
        if !medication.is_active_on(today) || slot.taken {
            continue;
        }

        let reminder_instant = today.and_time(slot.time);
        if now < reminder_instant
            && reminder_instant <= now + Duration::hours(UPCOMING_WINDOW_HOURS)
        {
            events.push(ReminderEvent::UpcomingDose {
                medication_id: medication.id,
                name: medication.name.clone(),
                dosage: medication.dosage.clone(),
                slot_id: slot.id,
                time: slot.time,
                minutes_until: round_minutes(reminder_instant - now),
            });
        } else if reminder_instant < now
            && now - reminder_instant < Duration::hours(OVERDUE_CAP_HOURS)
        {
            events.push(ReminderEvent::OverdueDose {
                medication_id: medication.id,
                name: medication.name.clone(),
                dosage: medication.dosage.clone(),
                slot_id: slot.id,
                time: slot.time,
                minutes_overdue: round_minutes(now - reminder_instant),
            });
        }
    }

    for medication in &medications {
        if !medication.refill_reminder {
            continue;
        }
        let Some(refill_date) = medication.refill_date else {
            continue;
        };
        let refill_instant = refill_date.and_time(NaiveTime::MIN);
        if now < refill_instant && refill_instant <= now + Duration::days(REFILL_WINDOW_DAYS) {
            events.push(ReminderEvent::RefillDue {
                medication_id: medication.id,
                name: medication.name.clone(),
                days_until: round_days(refill_instant - now),
            });
        }
    }

    Ok(events)
}

fn round_minutes(d: Duration) -> i64 {
    (d.num_seconds() as f64 / 60.0).round() as i64
}

fn round_days(d: Duration) -> i64 {
    (d.num_seconds() as f64 / 86_400.0).round() as i64
}
