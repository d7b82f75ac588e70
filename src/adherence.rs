//! Adherence tracking: toggling a dose slot's taken state and keeping the
//! append-only history in step, plus history listing for display.
//!
//! The history collection is never edited or removed here; only the
//! cascade in `delete_medication` may drop entries.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::db::{self, load_collection, save_collection, CollectionStore};
use crate::medications::{self, MedicationError};
use crate::models::{DoseSlot, HistoryEntry};
use crate::notify::{NotificationChannel, Severity};

const NOTE_TAKEN: &str = "Taken on time";
const NOTE_UNTAKEN: &str = "Marked as not taken";

/// Mark a dose slot taken or untaken as of `now`.
///
/// Updates both persisted views of the slot through the synchronization
/// routine, appends one history entry, and (for the taken path with a
/// known owner) emits a confirmation notification. There is no rollback:
/// if the history append fails after the slot writes, slot state is ahead
/// of the audit trail.
pub fn set_dose_taken(
    store: &dyn CollectionStore,
    notifier: &dyn NotificationChannel,
    slot_id: Uuid,
    taken: bool,
    now: NaiveDateTime,
) -> Result<DoseSlot, MedicationError> {
    let slots: Vec<DoseSlot> = load_collection(store, db::MEDICATION_SCHEDULE)?;
    let mut slot = slots
        .into_iter()
        .find(|s| s.id == slot_id)
        .ok_or_else(|| MedicationError::NotFound {
            entity: "dose slot",
            id: slot_id.to_string(),
        })?;

    slot.taken = taken;
    slot.taken_at = taken.then_some(now);

    let owner = medications::apply_slot_update(store, &slot)?;

    let entry = HistoryEntry {
        id: Uuid::new_v4(),
        medication_id: slot.medication_id,
        date: now.date(),
        taken,
        taken_at: slot.taken_at,
        dosage: owner.as_ref().map(|m| m.dosage.clone()).unwrap_or_default(),
        note: Some(if taken { NOTE_TAKEN } else { NOTE_UNTAKEN }.to_string()),
    };
    append_history(store, entry)?;

    if taken {
        if let Some(medication) = &owner {
            notifier.notify(
                "Medication Taken",
                &format!("You've marked {} as taken.", medication.name),
                Severity::Normal,
            );
        }
    }

    tracing::debug!(slot_id = %slot.id, taken, "Dose slot adherence updated");
    Ok(slot)
}

fn append_history(store: &dyn CollectionStore, entry: HistoryEntry) -> Result<(), MedicationError> {
    let mut history: Vec<HistoryEntry> = load_collection(store, db::MEDICATION_HISTORY)?;
    history.push(entry);
    save_collection(store, db::MEDICATION_HISTORY, &history)?;
    Ok(())
}

/// Raw history, insertion order.
pub fn list_history(store: &dyn CollectionStore) -> Result<Vec<HistoryEntry>, MedicationError> {
    Ok(load_collection(store, db::MEDICATION_HISTORY)?)
}

/// Display filters for the history screen. All criteria are optional and
/// conjunctive; date bounds are inclusive.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct HistoryFilter {
    pub medication_id: Option<Uuid>,
    pub date_from: Option<chrono::NaiveDate>,
    pub date_to: Option<chrono::NaiveDate>,
    pub taken: Option<bool>,
}

/// One history entry joined with its medication name for display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HistoryCard {
    pub entry: HistoryEntry,
    pub medication_name: String,
}

/// History entries filtered and joined for display, newest date first.
/// Entries whose medication no longer exists are shown with an
/// "Unknown Medication" label rather than dropped.
pub fn history_view(
    store: &dyn CollectionStore,
    filter: &Option<HistoryFilter>,
) -> Result<Vec<HistoryCard>, MedicationError> {
    let medications = medications::list_medications(store)?;
    let mut entries = list_history(store)?;

    if let Some(filter) = filter {
        entries.retain(|h| {
            filter.medication_id.map_or(true, |id| h.medication_id == id)
                && filter.date_from.map_or(true, |from| h.date >= from)
                && filter.date_to.map_or(true, |to| h.date <= to)
                && filter.taken.map_or(true, |taken| h.taken == taken)
        });
    }

    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let name_of = |id: Uuid| -> String {
        medications
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "Unknown Medication".to_string())
    };

    Ok(entries
        .into_iter()
        .map(|entry| HistoryCard {
            medication_name: name_of(entry.medication_id),
            entry,
        })
        .collect())
}
