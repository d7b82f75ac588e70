//! Medication store: CRUD over the `medications` collection plus the two
//! slot-synchronization routines that keep the flat `medication_schedule`
//! collection in lockstep with the embedded schedules.
//!
//! `replace_medication_slots` and `apply_slot_update` are the ONLY writers
//! of `medication_schedule`; never mutate either copy directly.

use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, load_collection, save_collection, CollectionStore, StoreError};
use crate::models::{DoseSlot, HistoryEntry, Medication, MedicationInput};
use crate::schedule::daily_dose_slots;

#[derive(Error, Debug)]
pub enum MedicationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// All medications, insertion order. A store with no prior writes reads
/// as an empty list.
pub fn list_medications(store: &dyn CollectionStore) -> Result<Vec<Medication>, MedicationError> {
    Ok(load_collection(store, db::MEDICATIONS)?)
}

/// Case-insensitive name-contains filter over the medication list.
pub fn search_medications(
    store: &dyn CollectionStore,
    query: &str,
) -> Result<Vec<Medication>, MedicationError> {
    let needle = query.trim().to_lowercase();
    let medications = list_medications(store)?;
    if needle.is_empty() {
        return Ok(medications);
    }
    Ok(medications
        .into_iter()
        .filter(|m| m.name.to_lowercase().contains(&needle))
        .collect())
}

/// Add a new medication: validates, assigns an id, generates the daily
/// dose slots, persists the medication and mirrors the slots into the
/// flat collection. Returns the persisted medication.
pub fn add_medication(
    store: &dyn CollectionStore,
    input: MedicationInput,
) -> Result<Medication, MedicationError> {
    if input.name.trim().is_empty() {
        return Err(MedicationError::Validation("medication name is required".into()));
    }
    if input.dosage.trim().is_empty() {
        return Err(MedicationError::Validation("medication dosage is required".into()));
    }

    let id = Uuid::new_v4();
    let medication = Medication {
        id,
        name: input.name,
        dosage: input.dosage,
        instructions: input.instructions,
        frequency: input.frequency,
        times_per_day: input.times_per_day,
        start_date: input.start_date,
        end_date: input.end_date,
        refill_date: input.refill_date,
        refill_reminder: input.refill_reminder,
        notes: input.notes,
        schedule: daily_dose_slots(id, input.times_per_day),
    };

    let mut medications = list_medications(store)?;
    medications.push(medication.clone());
    save_collection(store, db::MEDICATIONS, &medications)?;
    replace_medication_slots(store, id, &medication.schedule)?;

    tracing::info!(medication_id = %id, name = %medication.name, "Medication added");
    Ok(medication)
}

/// Replace the stored medication with a matching id and reconcile the
/// flat slot collection from its embedded sequence. If the dosing changed
/// (frequency or times-per-day), the schedule is regenerated in a fresh
/// batch before the replace.
pub fn update_medication(
    store: &dyn CollectionStore,
    mut medication: Medication,
) -> Result<Medication, MedicationError> {
    let mut medications = list_medications(store)?;
    let index = medications
        .iter()
        .position(|m| m.id == medication.id)
        .ok_or_else(|| MedicationError::NotFound {
            entity: "medication",
            id: medication.id.to_string(),
        })?;

    let stored = &medications[index];
    if stored.frequency != medication.frequency || stored.times_per_day != medication.times_per_day
    {
        medication.schedule = daily_dose_slots(medication.id, medication.times_per_day);
        tracing::debug!(medication_id = %medication.id, "Dosing changed, schedule regenerated");
    }

    medications[index] = medication.clone();
    save_collection(store, db::MEDICATIONS, &medications)?;
    replace_medication_slots(store, medication.id, &medication.schedule)?;

    Ok(medication)
}

/// Remove a medication and cascade removal of all its slots and history.
/// Irreversible.
pub fn delete_medication(store: &dyn CollectionStore, id: Uuid) -> Result<(), MedicationError> {
    let mut medications = list_medications(store)?;
    let index = medications
        .iter()
        .position(|m| m.id == id)
        .ok_or_else(|| MedicationError::NotFound {
            entity: "medication",
            id: id.to_string(),
        })?;

    let removed = medications.remove(index);
    save_collection(store, db::MEDICATIONS, &medications)?;
    replace_medication_slots(store, id, &[])?;

    let history: Vec<HistoryEntry> = load_collection(store, db::MEDICATION_HISTORY)?;
    let kept: Vec<HistoryEntry> = history.into_iter().filter(|h| h.medication_id != id).collect();
    save_collection(store, db::MEDICATION_HISTORY, &kept)?;

    tracing::info!(medication_id = %id, name = %removed.name, "Medication deleted with cascade");
    Ok(())
}

/// Synchronization routine, medication → flat: replace every slot owned
/// by `medication_id` in the flat collection with `slots` (full replace,
/// not merge).
pub(crate) fn replace_medication_slots(
    store: &dyn CollectionStore,
    medication_id: Uuid,
    slots: &[DoseSlot],
) -> Result<(), MedicationError> {
    let existing: Vec<DoseSlot> = load_collection(store, db::MEDICATION_SCHEDULE)?;
    let mut kept: Vec<DoseSlot> = existing
        .into_iter()
        .filter(|s| s.medication_id != medication_id)
        .collect();
    kept.extend_from_slice(slots);
    save_collection(store, db::MEDICATION_SCHEDULE, &kept)?;
    Ok(())
}

/// Synchronization routine, slot → both views: write the updated slot
/// into the flat collection first, then into the owning medication's
/// embedded copy. A missing owner is tolerated (the flat update still
/// lands) and reported by the consistency checker.
pub(crate) fn apply_slot_update(
    store: &dyn CollectionStore,
    slot: &DoseSlot,
) -> Result<Option<Medication>, MedicationError> {
    let mut slots: Vec<DoseSlot> = load_collection(store, db::MEDICATION_SCHEDULE)?;
    let index = slots
        .iter()
        .position(|s| s.id == slot.id)
        .ok_or_else(|| MedicationError::NotFound {
            entity: "dose slot",
            id: slot.id.to_string(),
        })?;
    slots[index] = slot.clone();
    save_collection(store, db::MEDICATION_SCHEDULE, &slots)?;

    let mut medications = list_medications(store)?;
    let Some(owner_index) = medications.iter().position(|m| m.id == slot.medication_id) else {
        tracing::warn!(
            slot_id = %slot.id,
            medication_id = %slot.medication_id,
            "Dose slot has no owning medication; embedded copy not updated"
        );
        return Ok(None);
    };

    if let Some(embedded) = medications[owner_index]
        .schedule
        .iter_mut()
        .find(|s| s.id == slot.id)
    {
        *embedded = slot.clone();
    }
    save_collection(store, db::MEDICATIONS, &medications)?;

    Ok(Some(medications[owner_index].clone()))
}
