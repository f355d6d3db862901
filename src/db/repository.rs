use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::db::kv;
use crate::error::AppError;
use crate::models::{Assignment, DefaultView, Exam, SentNotifications, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    UserName,
    Homeworks,
    Exams,
    NotificationsEnabled,
    DefaultView,
    SentNotifications,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::UserName => "userName",
            StoreKey::Homeworks => "homeworks",
            StoreKey::Exams => "exams",
            StoreKey::NotificationsEnabled => "notificationsEnabled",
            StoreKey::DefaultView => "defaultView",
            StoreKey::SentNotifications => "sentNotifications",
        }
    }
}

/// Typed access to every persisted key.
///
/// Readers may call the accessors freely. Anything that reads a collection,
/// changes it and writes it back must hold [`Store::lock`] for the whole
/// sequence so that two requests never interleave their replace-and-persist.
pub struct Store {
    db: SqlitePool,
    write_lock: Mutex<()>,
}

impl Store {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub async fn assignments(&self) -> Result<Vec<Assignment>, AppError> {
        kv::read(&self.db, StoreKey::Homeworks.as_str(), Vec::new()).await
    }

    pub async fn save_assignments(&self, assignments: &[Assignment]) -> Result<(), AppError> {
        kv::write(&self.db, StoreKey::Homeworks.as_str(), assignments).await
    }

    pub async fn exams(&self) -> Result<Vec<Exam>, AppError> {
        kv::read(&self.db, StoreKey::Exams.as_str(), Vec::new()).await
    }

    pub async fn save_exams(&self, exams: &[Exam]) -> Result<(), AppError> {
        kv::write(&self.db, StoreKey::Exams.as_str(), exams).await
    }

    pub async fn sent_notifications(&self) -> Result<SentNotifications, AppError> {
        kv::read(
            &self.db,
            StoreKey::SentNotifications.as_str(),
            SentNotifications::default(),
        )
        .await
    }

    pub async fn save_sent_notifications(&self, sent: &SentNotifications) -> Result<(), AppError> {
        kv::write(&self.db, StoreKey::SentNotifications.as_str(), sent).await
    }

    pub async fn user_name(&self) -> Result<String, AppError> {
        kv::read(&self.db, StoreKey::UserName.as_str(), String::new()).await
    }

    pub async fn save_user_name(&self, name: &str) -> Result<(), AppError> {
        kv::write(&self.db, StoreKey::UserName.as_str(), name).await
    }

    pub async fn notifications_enabled(&self) -> Result<bool, AppError> {
        kv::read(&self.db, StoreKey::NotificationsEnabled.as_str(), false).await
    }

    /// Takes the write lock so a running reminder check never sees the flag
    /// flip halfway through.
    pub async fn save_notifications_enabled(&self, enabled: bool) -> Result<(), AppError> {
        let _guard = self.lock().await;
        kv::write(&self.db, StoreKey::NotificationsEnabled.as_str(), &enabled).await
    }

    pub async fn default_view(&self) -> Result<DefaultView, AppError> {
        kv::read(&self.db, StoreKey::DefaultView.as_str(), DefaultView::default()).await
    }

    pub async fn save_default_view(&self, view: DefaultView) -> Result<(), AppError> {
        kv::write(&self.db, StoreKey::DefaultView.as_str(), &view).await
    }

    pub async fn settings(&self) -> Result<Settings, AppError> {
        Ok(Settings {
            user_name: self.user_name().await?,
            default_view: self.default_view().await?,
            notifications_enabled: self.notifications_enabled().await?,
        })
    }

    /// Give every stored record without an importance the Medium level.
    ///
    /// Operates on the raw JSON so records are rewritten exactly once and
    /// nothing else about them changes. Returns the number of records touched.
    pub async fn backfill_importance(&self) -> Result<usize, AppError> {
        let _guard = self.lock().await;
        let mut touched = 0;

        for key in [StoreKey::Homeworks, StoreKey::Exams] {
            let Some(raw) = kv::read_raw(&self.db, key.as_str()).await? else {
                continue;
            };
            let mut records: Value = serde_json::from_str(&raw)?;
            let Some(items) = records.as_array_mut() else {
                continue;
            };

            let mut changed = 0;
            for item in items.iter_mut() {
                if let Some(obj) = item.as_object_mut() {
                    let missing = obj
                        .get("importance")
                        .is_none_or(|v| v.is_null() || v.as_str() == Some(""));
                    if missing {
                        obj.insert("importance".to_string(), Value::from("Medium"));
                        changed += 1;
                    }
                }
            }

            if changed > 0 {
                kv::write(&self.db, key.as_str(), &records).await?;
                info!("Backfilled importance on {} {} records", changed, key.as_str());
                touched += changed;
            }
        }

        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::{AssignmentStatus, ExamStatus, Importance};
    use chrono::NaiveDate;

    async fn setup_store() -> Store {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        Store::new(pool)
    }

    fn homework(id: &str, course: &str, due: &str) -> Assignment {
        Assignment {
            id: id.to_string(),
            course_name: course.to_string(),
            assignment_title: format!("Problem Set {}", id),
            due_date: due.parse::<NaiveDate>().unwrap(),
            status: AssignmentStatus::NotStarted,
            importance: Importance::High,
            notes: Some("Chapter 5".to_string()),
        }
    }

    #[tokio::test]
    async fn test_assignments_roundtrip_preserves_order_and_fields() {
        let store = setup_store().await;
        assert!(store.assignments().await.unwrap().is_empty());

        let list = vec![
            homework("3", "MATH 101", "2024-03-20"),
            homework("1", "PHYS 150", "2024-03-01"),
            homework("2", "MATH 101", "2024-03-10"),
        ];
        store.save_assignments(&list).await.unwrap();

        let loaded = store.assignments().await.unwrap();
        assert_eq!(loaded, list);
    }

    #[tokio::test]
    async fn test_exams_roundtrip() {
        let store = setup_store().await;
        let exams = vec![Exam {
            id: "e1".to_string(),
            course_name: "CHEM 110".to_string(),
            exam_title: "Midterm".to_string(),
            exam_date: "2024-04-10T14:00:00".parse().unwrap(),
            location: Some("Room 201".to_string()),
            topics: None,
            status: ExamStatus::Studying,
            importance: Importance::Low,
        }];
        store.save_exams(&exams).await.unwrap();
        assert_eq!(store.exams().await.unwrap(), exams);
    }

    #[tokio::test]
    async fn test_exams_roundtrip_keeps_seconds() {
        let store = setup_store().await;
        let exams = vec![
            Exam {
                id: "e1".to_string(),
                course_name: "CHEM 110".to_string(),
                exam_title: "Lab practical".to_string(),
                exam_date: "2024-04-10T14:00:30".parse().unwrap(),
                location: None,
                topics: None,
                status: ExamStatus::Upcoming,
                importance: Importance::Medium,
            },
            Exam {
                id: "e2".to_string(),
                course_name: "CHEM 110".to_string(),
                exam_title: "Final".to_string(),
                exam_date: "2024-05-01T09:00:00".parse().unwrap(),
                location: None,
                topics: None,
                status: ExamStatus::Upcoming,
                importance: Importance::Medium,
            },
        ];
        store.save_exams(&exams).await.unwrap();
        assert_eq!(store.exams().await.unwrap(), exams);

        let raw = kv::read_raw(store.pool(), StoreKey::Exams.as_str())
            .await
            .unwrap()
            .unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["examDate"], "2024-04-10T14:00:30");
        assert_eq!(value[1]["examDate"], "2024-05-01T09:00");
    }

    #[tokio::test]
    async fn test_settings_defaults_and_updates() {
        let store = setup_store().await;
        let settings = store.settings().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_view, DefaultView::Agenda);

        store.save_user_name("Ada").await.unwrap();
        store.save_default_view(DefaultView::Exams).await.unwrap();
        store.save_notifications_enabled(true).await.unwrap();

        let settings = store.settings().await.unwrap();
        assert_eq!(settings.user_name, "Ada");
        assert_eq!(settings.default_view, DefaultView::Exams);
        assert!(settings.notifications_enabled);
    }

    #[tokio::test]
    async fn test_backfill_importance_rewrites_legacy_records_once() {
        let store = setup_store().await;
        let legacy = serde_json::json!([
            {"id": "1", "courseName": "MATH 101", "assignmentTitle": "PS1",
             "dueDate": "2024-03-15", "status": "Not Started"},
            {"id": "2", "courseName": "MATH 101", "assignmentTitle": "PS2",
             "dueDate": "2024-03-22", "status": "Not Started", "importance": "High"},
            {"id": "3", "courseName": "MATH 101", "assignmentTitle": "PS3",
             "dueDate": "2024-03-29", "status": "Not Started", "importance": ""}
        ]);
        kv::write(store.pool(), StoreKey::Homeworks.as_str(), &legacy).await.unwrap();

        assert_eq!(store.backfill_importance().await.unwrap(), 2);
        assert_eq!(store.backfill_importance().await.unwrap(), 0);

        let raw = kv::read_raw(store.pool(), StoreKey::Homeworks.as_str())
            .await
            .unwrap()
            .unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["importance"], "Medium");
        assert_eq!(value[1]["importance"], "High");
        assert_eq!(value[2]["importance"], "Medium");
        assert_eq!(store.assignments().await.unwrap().len(), 3);
    }
}
