use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::db::Store;
use crate::error::AppError;
use crate::models::dates;
use crate::notify::{Notifier, Permission};

pub const REMINDER_TITLE: &str = "Homework Due Tomorrow!";

/// Due-tomorrow reminder check.
///
/// Run after every change to the assignments or the notification settings,
/// and on a fixed interval so that the passing of midnight is noticed.
pub struct ReminderScheduler {
    store: Arc<Store>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(store: Arc<Store>, notifier: Arc<dyn Notifier>, interval_secs: u64) -> Self {
        Self {
            store,
            notifier,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Re-run the check forever at the configured interval, starting now.
    pub async fn start(self: Arc<Self>) {
        info!("Starting reminder scheduler (interval: {:?})", self.interval);
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            ticker.tick().await;

            match self.evaluate(dates::today_local()).await {
                Ok(0) => debug!("Reminder check found nothing due tomorrow"),
                Ok(fired) => info!("Reminder check sent {} notifications", fired),
                Err(e) => {
                    // keep looping; the next tick retries with fresh state
                    tracing::warn!("Reminder check failed: {:?}", e);
                }
            }
        }
    }

    /// Notify once for every unfinished assignment due the day after `today`.
    /// Returns how many notifications were emitted.
    pub async fn evaluate(&self, today: NaiveDate) -> Result<usize, AppError> {
        if self.notifier.permission() != Permission::Granted {
            debug!("Reminders skipped: notification permission not granted");
            return Ok(0);
        }
        let Some(tomorrow) = dates::tomorrow(today) else {
            return Ok(0);
        };

        let _guard = self.store.lock().await;
        if !self.store.notifications_enabled().await? {
            debug!("Reminders skipped: notifications disabled");
            return Ok(0);
        }
        let assignments = self.store.assignments().await?;
        let mut sent = self.store.sent_notifications().await?;
        let mut fired = 0;

        for hw in &assignments {
            if hw.is_completed() || sent.contains(&hw.id) || hw.due_date != tomorrow {
                continue;
            }

            let body = format!("{}: \"{}\" is due tomorrow.", hw.course_name, hw.assignment_title);
            self.notifier.show(REMINDER_TITLE, &body).await;
            sent.mark(&hw.id);
            fired += 1;
        }

        if fired > 0 {
            self.store.save_sent_notifications(&sent).await?;
        }

        Ok(fired)
    }
}
