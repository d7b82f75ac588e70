//! Daily dose-slot generation.
//!
//! Slots are spread across a fixed daytime window anchored at 08:00 —
//! a simple deterministic placement, not a clinical scheduling algorithm.
//! Duplicate times across different counts are acceptable.

use chrono::NaiveTime;
use uuid::Uuid;

use crate::models::DoseSlot;

/// First dose of the day.
pub const ANCHOR_HOUR: u32 = 8;

/// Width of the daytime dosing window in hours.
pub const WINDOW_HOURS: u32 = 12;

/// Deterministic slot id for (medication, ordinal): stable across
/// regenerations so a re-derived schedule reuses the same ids.
pub fn dose_slot_id(medication_id: Uuid, ordinal: u32) -> Uuid {
    Uuid::new_v5(&medication_id, format!("dose-{ordinal}").as_bytes())
}

/// Generate `times_per_day` dose slots for a medication, evenly spaced
/// from 08:00 with spacing `WINDOW_HOURS / times_per_day` (hour floored,
/// minutes fixed at 0). A count of 1 yields a single 08:00 slot; a count
/// of 0 yields an empty schedule.
pub fn daily_dose_slots(medication_id: Uuid, times_per_day: u32) -> Vec<DoseSlot> {
    (0..times_per_day)
        .map(|i| {
            let hour = ANCHOR_HOUR + (i * WINDOW_HOURS) / times_per_day;
            DoseSlot {
                id: dose_slot_id(medication_id, i),
                medication_id,
                // hour < ANCHOR_HOUR + WINDOW_HOURS for every i < times_per_day
                time: NaiveTime::from_hms_opt(hour, 0, 0)
                    .expect("dose hour stays inside the daytime window"),
                taken: false,
                taken_at: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(slots: &[DoseSlot]) -> Vec<u32> {
        use chrono::Timelike;
        slots.iter().map(|s| s.time.hour()).collect()
    }

    #[test]
    fn single_dose_lands_at_eight() {
        let slots = daily_dose_slots(Uuid::new_v4(), 1);
        assert_eq!(hours(&slots), vec![8]);
        assert!(slots.iter().all(|s| !s.taken && s.taken_at.is_none()));
    }

    #[test]
    fn counts_one_through_four_floor_evenly() {
        let id = Uuid::new_v4();
        assert_eq!(hours(&daily_dose_slots(id, 1)), vec![8]);
        assert_eq!(hours(&daily_dose_slots(id, 2)), vec![8, 14]);
        assert_eq!(hours(&daily_dose_slots(id, 3)), vec![8, 12, 16]);
        assert_eq!(hours(&daily_dose_slots(id, 4)), vec![8, 11, 14, 17]);
    }

    #[test]
    fn minutes_are_always_zero() {
        use chrono::Timelike;
        for n in 1..=4 {
            for slot in daily_dose_slots(Uuid::new_v4(), n) {
                assert_eq!(slot.time.minute(), 0);
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let id = Uuid::new_v4();
        let first = daily_dose_slots(id, 3);
        let second = daily_dose_slots(id, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn slot_ids_are_stable_per_ordinal() {
        let id = Uuid::new_v4();
        assert_eq!(dose_slot_id(id, 0), dose_slot_id(id, 0));
        assert_ne!(dose_slot_id(id, 0), dose_slot_id(id, 1));
        assert_ne!(dose_slot_id(id, 0), dose_slot_id(Uuid::new_v4(), 0));
    }

    #[test]
    fn zero_count_yields_empty_schedule() {
        assert!(daily_dose_slots(Uuid::new_v4(), 0).is_empty());
    }

    #[test]
    fn slots_carry_owning_medication_id() {
        let id = Uuid::new_v4();
        for slot in daily_dose_slots(id, 4) {
            assert_eq!(slot.medication_id, id);
        }
    }
}
