use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Importance, dates};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub course_name: String,
    pub assignment_title: String,
    pub due_date: NaiveDate,
    pub status: AssignmentStatus,
    // Records written before importance existed lack the field.
    #[serde(default)]
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Assignment {
    pub fn is_completed(&self) -> bool {
        self.status == AssignmentStatus::Completed
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignmentRequest {
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub assignment_title: String,
    #[serde(default, with = "dates::due_date_opt")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub importance: Option<Importance>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewAssignmentRequest {
    /// Validate the submission and build a fresh record with the default status.
    pub fn into_assignment(self, id: String) -> Result<Assignment, AppError> {
        let due_date = match self.due_date {
            Some(d) if has_text(&self.course_name) && has_text(&self.assignment_title) => d,
            _ => return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
        };

        Ok(Assignment {
            id,
            course_name: self.course_name,
            assignment_title: self.assignment_title,
            due_date,
            status: AssignmentStatus::NotStarted,
            importance: self.importance.unwrap_or_default(),
            notes: self.notes,
        })
    }
}

/// Whole-record replacement submitted from the edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub assignment_title: String,
    #[serde(default, with = "dates::due_date_opt")]
    pub due_date: Option<NaiveDate>,
    pub status: AssignmentStatus,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateAssignmentRequest {
    pub fn apply_to(self, current: &Assignment) -> Result<Assignment, AppError> {
        let due_date = match self.due_date {
            Some(d) if has_text(&self.course_name) && has_text(&self.assignment_title) => d,
            _ => return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
        };

        Ok(Assignment {
            id: current.id.clone(),
            course_name: self.course_name,
            assignment_title: self.assignment_title,
            due_date,
            status: self.status,
            importance: self.importance,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentStatusRequest {
    pub status: AssignmentStatus,
}

pub(crate) fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}
