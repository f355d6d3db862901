use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultView {
    Homework,
    Exams,
    #[default]
    Agenda,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub user_name: String,
    pub default_view: DefaultView,
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub user_name: Option<String>,
    pub default_view: Option<DefaultView>,
    pub notifications_enabled: Option<bool>,
}

/// Assignment ids that already triggered a due-tomorrow reminder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentNotifications(BTreeMap<String, bool>);

impl SentNotifications {
    pub fn contains(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    pub fn mark(&mut self, id: &str) {
        self.0.insert(id.to_string(), true);
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
