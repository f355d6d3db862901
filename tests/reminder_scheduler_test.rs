use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use studydesk::db::{Store, connect_in_memory};
use studydesk::models::{Assignment, AssignmentStatus, Importance, SentNotifications, dates};
use studydesk::notify::{Notifier, Permission};
use studydesk::services::ReminderScheduler;
use studydesk::services::reminders::REMINDER_TITLE;

struct RecordingNotifier {
    permission: Permission,
    shown: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn new(permission: Permission) -> Arc<Self> {
        Arc::new(Self {
            permission,
            shown: Mutex::new(Vec::new()),
        })
    }

    fn count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    async fn request_permission(&self) -> Permission {
        self.permission
    }

    async fn show(&self, title: &str, body: &str) {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}

async fn setup_store() -> Arc<Store> {
    let pool = connect_in_memory().await.expect("Failed to create database");
    Arc::new(Store::new(pool))
}

fn homework(id: &str, due: NaiveDate, status: AssignmentStatus) -> Assignment {
    Assignment {
        id: id.to_string(),
        course_name: "MATH 101".to_string(),
        assignment_title: format!("Problem Set {}", id),
        due_date: due,
        status,
        importance: Importance::Medium,
        notes: None,
    }
}

fn today() -> NaiveDate {
    dates::parse_due_date("2024-03-14").unwrap()
}

fn tomorrow() -> NaiveDate {
    dates::parse_due_date("2024-03-15").unwrap()
}

#[tokio::test]
async fn test_due_tomorrow_fires_exactly_once() {
    let store = setup_store().await;
    store.save_notifications_enabled(true).await.unwrap();
    store
        .save_assignments(&[homework("1", tomorrow(), AssignmentStatus::NotStarted)])
        .await
        .unwrap();

    let notifier = RecordingNotifier::new(Permission::Granted);
    let scheduler = ReminderScheduler::new(store.clone(), notifier.clone(), 60);

    assert_eq!(scheduler.evaluate(today()).await.unwrap(), 1);
    assert_eq!(scheduler.evaluate(today()).await.unwrap(), 0);

    let shown = notifier.shown.lock().unwrap().clone();
    assert_eq!(
        shown,
        vec![(
            REMINDER_TITLE.to_string(),
            "MATH 101: \"Problem Set 1\" is due tomorrow.".to_string()
        )]
    );
    assert!(store.sent_notifications().await.unwrap().contains("1"));
}

#[tokio::test]
async fn test_sent_set_survives_restart() {
    let store = setup_store().await;
    store.save_notifications_enabled(true).await.unwrap();
    store
        .save_assignments(&[homework("1", tomorrow(), AssignmentStatus::InProgress)])
        .await
        .unwrap();

    let first = RecordingNotifier::new(Permission::Granted);
    ReminderScheduler::new(store.clone(), first.clone(), 60)
        .evaluate(today())
        .await
        .unwrap();

    let second = RecordingNotifier::new(Permission::Granted);
    let fired = ReminderScheduler::new(store.clone(), second.clone(), 60)
        .evaluate(today())
        .await
        .unwrap();

    assert_eq!(first.count(), 1);
    assert_eq!(fired, 0);
    assert_eq!(second.count(), 0);
}

#[tokio::test]
async fn test_disabled_or_denied_is_noop() {
    let store = setup_store().await;
    store
        .save_assignments(&[homework("1", tomorrow(), AssignmentStatus::NotStarted)])
        .await
        .unwrap();

    let notifier = RecordingNotifier::new(Permission::Granted);
    let scheduler = ReminderScheduler::new(store.clone(), notifier.clone(), 60);
    assert_eq!(scheduler.evaluate(today()).await.unwrap(), 0);

    store.save_notifications_enabled(true).await.unwrap();
    for permission in [Permission::Denied, Permission::Default] {
        let notifier = RecordingNotifier::new(permission);
        let scheduler = ReminderScheduler::new(store.clone(), notifier.clone(), 60);
        assert_eq!(scheduler.evaluate(today()).await.unwrap(), 0);
        assert_eq!(notifier.count(), 0);
    }

    assert_eq!(notifier.count(), 0);
    assert!(store.sent_notifications().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_open_assignments_due_tomorrow_fire() {
    let store = setup_store().await;
    store.save_notifications_enabled(true).await.unwrap();

    let mut already = SentNotifications::default();
    already.mark("sent-before");
    store.save_sent_notifications(&already).await.unwrap();

    store
        .save_assignments(&[
            homework("done", tomorrow(), AssignmentStatus::Completed),
            homework("today", today(), AssignmentStatus::NotStarted),
            homework("later", dates::parse_due_date("2024-03-16").unwrap(), AssignmentStatus::NotStarted),
            homework("sent-before", tomorrow(), AssignmentStatus::NotStarted),
            homework("a", tomorrow(), AssignmentStatus::NotStarted),
            homework("b", tomorrow(), AssignmentStatus::InProgress),
        ])
        .await
        .unwrap();

    let notifier = RecordingNotifier::new(Permission::Granted);
    let scheduler = ReminderScheduler::new(store.clone(), notifier.clone(), 60);
    assert_eq!(scheduler.evaluate(today()).await.unwrap(), 2);

    let bodies: Vec<String> = notifier.shown.lock().unwrap().iter().map(|(_, b)| b.clone()).collect();
    assert!(bodies[0].contains("Problem Set a"));
    assert!(bodies[1].contains("Problem Set b"));

    let sent = store.sent_notifications().await.unwrap();
    assert_eq!(sent.len(), 3);
    assert!(!sent.contains("done"));
}

#[tokio::test]
async fn test_month_rollover() {
    let store = setup_store().await;
    store.save_notifications_enabled(true).await.unwrap();
    store
        .save_assignments(&[homework(
            "1",
            dates::parse_due_date("2024-03-01").unwrap(),
            AssignmentStatus::NotStarted,
        )])
        .await
        .unwrap();

    let notifier = RecordingNotifier::new(Permission::Granted);
    let scheduler = ReminderScheduler::new(store, notifier.clone(), 60);
    let leap_day = dates::parse_due_date("2024-02-29").unwrap();
    assert_eq!(scheduler.evaluate(leap_day).await.unwrap(), 1);
}

#[tokio::test]
async fn test_scheduler_loop_checks_on_start() {
    let store = setup_store().await;
    store.save_notifications_enabled(true).await.unwrap();

    let due = dates::today_local()
        .checked_add_days(Days::new(1))
        .expect("tomorrow exists");
    store
        .save_assignments(&[homework("1", due, AssignmentStatus::NotStarted)])
        .await
        .unwrap();

    let notifier = RecordingNotifier::new(Permission::Granted);
    let scheduler = Arc::new(ReminderScheduler::new(store, notifier.clone(), 1));

    let task = tokio::spawn(scheduler.start());
    tokio::time::sleep(Duration::from_millis(1500)).await;
    task.abort();

    // first tick fires, later ticks find the id in the sent set
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_disable_queued_before_check_wins() {
    let store = setup_store().await;
    store.save_notifications_enabled(true).await.unwrap();
    store
        .save_assignments(&[homework("1", tomorrow(), AssignmentStatus::NotStarted)])
        .await
        .unwrap();

    let notifier = RecordingNotifier::new(Permission::Granted);
    let scheduler = Arc::new(ReminderScheduler::new(store.clone(), notifier.clone(), 60));

    // tokio's mutex is fair: waiters are served in the order they queued
    let guard = store.lock().await;

    let disable = tokio::spawn({
        let store = store.clone();
        async move { store.save_notifications_enabled(false).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let check = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.evaluate(today()).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    drop(guard);
    disable.await.unwrap().unwrap();
    assert_eq!(check.await.unwrap().unwrap(), 0);
    assert_eq!(notifier.count(), 0);
    assert!(store.sent_notifications().await.unwrap().is_empty());
}
