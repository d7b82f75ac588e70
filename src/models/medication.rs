use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Frequency;

/// A dosing regimen. The embedded `schedule` is kept in lockstep with the
/// flat `medication_schedule` collection; only the synchronization routines
/// in `crate::medications` may write either copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub instructions: String,
    pub frequency: Frequency,
    /// Meaningful only when `frequency` is daily; weekly and as-needed
    /// regimens conventionally carry 1.
    pub times_per_day: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub refill_date: Option<NaiveDate>,
    pub refill_reminder: bool,
    pub notes: Option<String>,
    pub schedule: Vec<DoseSlot>,
}

impl Medication {
    /// Whether the regimen's active window covers `date`
    /// (start ≤ date ≤ end; no end date means open-ended).
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }
}

/// One scheduled administration time within a day.
///
/// Created in a batch when a medication is added or its dosing changes,
/// mutated only through the adherence tracker, destroyed only by cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseSlot {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub time: NaiveTime,
    pub taken: bool,
    /// Present iff `taken` is true.
    pub taken_at: Option<NaiveDateTime>,
}

/// An immutable adherence event. Append-only; `dosage` is a snapshot of
/// the owning medication's dosage at event time, not a live reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub medication_id: Uuid,
    /// Calendar date the event is attributed to.
    pub date: NaiveDate,
    pub taken: bool,
    pub taken_at: Option<NaiveDateTime>,
    pub dosage: String,
    pub note: Option<String>,
}

/// A medication definition as submitted by the intake form —
/// everything except the assigned id and the generated schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationInput {
    pub name: String,
    pub dosage: String,
    pub instructions: String,
    pub frequency: Frequency,
    pub times_per_day: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub refill_date: Option<NaiveDate>,
    pub refill_reminder: bool,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn med(start: NaiveDate, end: Option<NaiveDate>) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: "Lisinopril".into(),
            dosage: "10mg".into(),
            instructions: String::new(),
            frequency: Frequency::Daily,
            times_per_day: 1,
            start_date: start,
            end_date: end,
            refill_date: None,
            refill_reminder: false,
            notes: None,
            schedule: vec![],
        }
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn active_window_open_ended() {
        let m = med(d("2026-01-10"), None);
        assert!(!m.is_active_on(d("2026-01-09")));
        assert!(m.is_active_on(d("2026-01-10")));
        assert!(m.is_active_on(d("2030-12-31")));
    }

    #[test]
    fn active_window_bounded() {
        let m = med(d("2026-01-10"), Some(d("2026-01-20")));
        assert!(m.is_active_on(d("2026-01-10")));
        assert!(m.is_active_on(d("2026-01-20")));
        assert!(!m.is_active_on(d("2026-01-21")));
    }

    #[test]
    fn medication_json_round_trip() {
        let m = med(d("2026-03-01"), Some(d("2026-06-01")));
        let json = serde_json::to_string(&m).unwrap();
        let back: Medication = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert!(json.contains("\"daily\""));
    }
}
