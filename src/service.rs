//! Service facade — the interface an embedding UI consumes.
//!
//! Owns the collection store, the notification channel, and the reminder
//! scheduler handle. All clock reads happen here (and in the scheduler
//! loop); the component functions underneath take explicit instants.

use std::sync::{Arc, Mutex};

use chrono::Local;
use uuid::Uuid;

use crate::adherence::{self, HistoryCard, HistoryFilter};
use crate::consistency::{self, ScheduleConsistencyReport};
use crate::db::CollectionStore;
use crate::medications::{self, MedicationError};
use crate::models::{DoseSlot, HistoryEntry, Medication, MedicationInput};
use crate::notify::NotificationChannel;
use crate::reminders;
use crate::scheduler::{start_reminder_scheduler, ReminderConfig, ReminderScheduler};

pub struct MedicationService {
    store: Arc<dyn CollectionStore>,
    notifier: Arc<dyn NotificationChannel>,
    config: ReminderConfig,
    scheduler: Mutex<Option<ReminderScheduler>>,
}

impl MedicationService {
    pub fn new(store: Arc<dyn CollectionStore>, notifier: Arc<dyn NotificationChannel>) -> Self {
        Self::with_config(store, notifier, ReminderConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn CollectionStore>,
        notifier: Arc<dyn NotificationChannel>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            scheduler: Mutex::new(None),
        }
    }

    pub fn list_medications(&self) -> Result<Vec<Medication>, MedicationError> {
        medications::list_medications(self.store.as_ref())
    }

    pub fn search_medications(&self, query: &str) -> Result<Vec<Medication>, MedicationError> {
        medications::search_medications(self.store.as_ref(), query)
    }

    pub fn add_medication(&self, input: MedicationInput) -> Result<Medication, MedicationError> {
        medications::add_medication(self.store.as_ref(), input)
    }

    pub fn update_medication(&self, medication: Medication) -> Result<Medication, MedicationError> {
        medications::update_medication(self.store.as_ref(), medication)
    }

    pub fn delete_medication(&self, id: Uuid) -> Result<(), MedicationError> {
        medications::delete_medication(self.store.as_ref(), id)
    }

    pub fn mark_taken(&self, slot_id: Uuid, taken: bool) -> Result<DoseSlot, MedicationError> {
        adherence::set_dose_taken(
            self.store.as_ref(),
            self.notifier.as_ref(),
            slot_id,
            taken,
            Local::now().naive_local(),
        )
    }

    pub fn list_history(&self) -> Result<Vec<HistoryEntry>, MedicationError> {
        adherence::list_history(self.store.as_ref())
    }

    pub fn history_view(
        &self,
        filter: &Option<HistoryFilter>,
    ) -> Result<Vec<HistoryCard>, MedicationError> {
        adherence::history_view(self.store.as_ref(), filter)
    }

    /// Dose slots of medications active today.
    pub fn today_schedule(&self) -> Result<Vec<DoseSlot>, MedicationError> {
        reminders::today_dose_slots(self.store.as_ref(), Local::now().date_naive())
    }

    /// Activate the reminder loop: one immediate evaluation, then the
    /// periodic timer. A no-op when already active.
    pub fn activate_reminders(&self) -> Result<(), MedicationError> {
        let mut guard = self.scheduler.lock().map_err(|_| MedicationError::LockPoisoned)?;
        if guard.is_some() {
            tracing::debug!("Reminder scheduler already active");
            return Ok(());
        }
        *guard = Some(start_reminder_scheduler(
            self.store.clone(),
            self.notifier.clone(),
            self.config.clone(),
        ));
        Ok(())
    }

    /// Deactivate the reminder loop. Dropping the handle signals the
    /// thread and joins it; no further evaluations occur until
    /// reactivated.
    pub fn deactivate_reminders(&self) -> Result<(), MedicationError> {
        let mut guard = self.scheduler.lock().map_err(|_| MedicationError::LockPoisoned)?;
        if guard.take().is_none() {
            tracing::debug!("Reminder scheduler already inactive");
        }
        Ok(())
    }

    pub fn reminders_active(&self) -> Result<bool, MedicationError> {
        let guard = self.scheduler.lock().map_err(|_| MedicationError::LockPoisoned)?;
        Ok(guard.is_some())
    }

    pub fn check_consistency(&self) -> Result<ScheduleConsistencyReport, MedicationError> {
        consistency::check_schedule_consistency(self.store.as_ref())
    }

    pub fn repair_consistency(&self) -> Result<usize, MedicationError> {
        consistency::repair_schedule_consistency(self.store.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::medications::test_support::metformin_input;
    use crate::notify::Severity;
    use chrono::Timelike;
    use std::sync::Mutex as StdMutex;

    struct RecordingNotifier {
        sent: StdMutex<Vec<(String, String, Severity)>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self { sent: StdMutex::new(Vec::new()) }
        }
    }

    impl NotificationChannel for RecordingNotifier {
        fn notify(&self, title: &str, description: &str, severity: Severity) {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), description.to_string(), severity));
        }
    }

    fn service() -> (MedicationService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let service = MedicationService::new(Arc::new(MemoryStore::new()), notifier.clone());
        (service, notifier)
    }

    #[test]
    fn metformin_scenario_end_to_end() {
        let (service, notifier) = service();

        let med = service.add_medication(metformin_input()).unwrap();
        let hours: Vec<u32> = med.schedule.iter().map(|s| s.time.hour()).collect();
        assert_eq!(hours, vec![8, 14]);

        let morning = med.schedule[0].id;
        let slot = service.mark_taken(morning, true).unwrap();
        assert!(slot.taken);

        let history = service.list_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, Local::now().date_naive());
        assert!(history[0].taken);
        assert_eq!(history[0].dosage, "500mg");

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Medication Taken");
    }

    #[test]
    fn activate_is_idempotent_and_deactivate_releases() {
        let (service, _notifier) = service();

        assert!(!service.reminders_active().unwrap());
        service.activate_reminders().unwrap();
        assert!(service.reminders_active().unwrap());
        // second activation is a no-op
        service.activate_reminders().unwrap();
        assert!(service.reminders_active().unwrap());

        service.deactivate_reminders().unwrap();
        assert!(!service.reminders_active().unwrap());
        // deactivating again is harmless
        service.deactivate_reminders().unwrap();
    }

    #[test]
    fn facade_delegates_crud_and_diagnostics() {
        let (service, _) = service();
        let med = service.add_medication(metformin_input()).unwrap();

        assert_eq!(service.search_medications("metf").unwrap().len(), 1);
        assert!(service.check_consistency().unwrap().issues.is_empty());
        assert_eq!(service.repair_consistency().unwrap(), 0);

        service.delete_medication(med.id).unwrap();
        assert!(service.list_medications().unwrap().is_empty());
        assert!(service.today_schedule().unwrap().is_empty());
        assert!(service.history_view(&None).unwrap().is_empty());
    }
}
