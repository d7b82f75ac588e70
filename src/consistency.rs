//! Schedule consistency diagnostics.
//!
//! A medication's embedded slot sequence must equal the flat
//! `medication_schedule` slots carrying its id. The checker reports
//! divergence and orphans; the repairer rewrites the flat collection from
//! the embedded sequences (medications own their slots) and drops orphans.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, load_collection, save_collection, CollectionStore};
use crate::medications::{self, MedicationError};
use crate::models::{DoseSlot, HistoryEntry};

/// A single consistency issue detected by the checker.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyIssue {
    pub category: String,
    pub severity: String,
    pub description: String,
    pub medication_id: Option<Uuid>,
}

/// Result of a consistency check across the three collections.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleConsistencyReport {
    pub issues: Vec<ConsistencyIssue>,
    pub medications_checked: usize,
}

/// Check the embedded-vs-flat slot invariant and look for orphans.
///
/// Detects:
/// - a medication whose embedded slots differ from its flat slots
/// - flat slots whose owning medication no longer exists
/// - history entries whose owning medication no longer exists
pub fn check_schedule_consistency(
    store: &dyn CollectionStore,
) -> Result<ScheduleConsistencyReport, MedicationError> {
    let medications = medications::list_medications(store)?;
    let slots: Vec<DoseSlot> = load_collection(store, db::MEDICATION_SCHEDULE)?;
    let history: Vec<HistoryEntry> = load_collection(store, db::MEDICATION_HISTORY)?;

    let mut issues = Vec::new();
    let known: HashSet<Uuid> = medications.iter().map(|m| m.id).collect();

    for medication in &medications {
        let embedded: BTreeSet<String> = medication
            .schedule
            .iter()
            .map(slot_fingerprint)
            .collect();
        let flat: BTreeSet<String> = slots
            .iter()
            .filter(|s| s.medication_id == medication.id)
            .map(|s| slot_fingerprint(s))
            .collect();

        if embedded != flat {
            issues.push(ConsistencyIssue {
                category: "slot_divergence".into(),
                severity: "high".into(),
                description: format!(
                    "Embedded schedule ({} slots) diverges from flat collection ({} slots)",
                    embedded.len(),
                    flat.len()
                ),
                medication_id: Some(medication.id),
            });
        }
    }

    let orphaned_slots = slots.iter().filter(|s| !known.contains(&s.medication_id)).count();
    if orphaned_slots > 0 {
        issues.push(ConsistencyIssue {
            category: "orphaned_slots".into(),
            severity: "medium".into(),
            description: format!("{orphaned_slots} dose slots without an owning medication"),
            medication_id: None,
        });
    }

    let orphaned_history = history.iter().filter(|h| !known.contains(&h.medication_id)).count();
    if orphaned_history > 0 {
        issues.push(ConsistencyIssue {
            category: "orphaned_history".into(),
            severity: "low".into(),
            description: format!("{orphaned_history} history entries without an owning medication"),
            medication_id: None,
        });
    }

    Ok(ScheduleConsistencyReport {
        issues,
        medications_checked: medications.len(),
    })
}

/// Repair what the checker flags: rewrite the flat slot collection from
/// the embedded sequences and drop orphaned history entries.
///
/// Returns the number of issues repaired.
pub fn repair_schedule_consistency(store: &dyn CollectionStore) -> Result<usize, MedicationError> {
    let report = check_schedule_consistency(store)?;
    if report.issues.is_empty() {
        return Ok(0);
    }

    let medications = medications::list_medications(store)?;
    let known: HashSet<Uuid> = medications.iter().map(|m| m.id).collect();

    let rebuilt: Vec<DoseSlot> = medications
        .iter()
        .flat_map(|m| m.schedule.iter().cloned())
        .collect();
    save_collection(store, db::MEDICATION_SCHEDULE, &rebuilt)?;

    let history: Vec<HistoryEntry> = load_collection(store, db::MEDICATION_HISTORY)?;
    let kept: Vec<HistoryEntry> = history
        .into_iter()
        .filter(|h| known.contains(&h.medication_id))
        .collect();
    save_collection(store, db::MEDICATION_HISTORY, &kept)?;

    tracing::info!(repaired = report.issues.len(), "Schedule consistency repaired");
    Ok(report.issues.len())
}

// Order-insensitive comparison key: the full slot state, not just the id,
// so a taken flag out of step counts as divergence.
fn slot_fingerprint(slot: &DoseSlot) -> String {
    format!(
        "{}|{}|{}|{}|{:?}",
        slot.id, slot.medication_id, slot.time, slot.taken, slot.taken_at
    )
}
