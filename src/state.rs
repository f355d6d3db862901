use std::sync::Arc;

use crate::db::Store;
use crate::gemini::TextGenerator;
use crate::notify::Notifier;
use crate::services::{ReminderScheduler, StudyPlanService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub reminders: Arc<ReminderScheduler>,
    pub study_plan: Arc<StudyPlanService>,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        notifier: Arc<dyn Notifier>,
        generator: Arc<dyn TextGenerator>,
        reminder_interval_secs: u64,
    ) -> Self {
        let reminders = ReminderScheduler::new(store.clone(), notifier, reminder_interval_secs);
        Self {
            store,
            reminders: Arc::new(reminders),
            study_plan: Arc::new(StudyPlanService::new(generator)),
        }
    }
}
