use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::assignment::{REQUIRED_FIELDS_MESSAGE, has_text};
use crate::models::{Importance, dates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExamStatus {
    #[default]
    Upcoming,
    Studying,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub course_name: String,
    pub exam_title: String,
    #[serde(with = "dates::exam_moment")]
    pub exam_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<String>,
    pub status: ExamStatus,
    #[serde(default)]
    pub importance: Importance,
}

impl Exam {
    pub fn is_completed(&self) -> bool {
        self.status == ExamStatus::Completed
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExamRequest {
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub exam_title: String,
    #[serde(default, with = "dates::exam_moment_opt")]
    pub exam_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub topics: Option<String>,
    #[serde(default)]
    pub importance: Option<Importance>,
}

impl NewExamRequest {
    pub fn into_exam(self, id: String) -> Result<Exam, AppError> {
        let exam_date = match self.exam_date {
            Some(d) if has_text(&self.course_name) && has_text(&self.exam_title) => d,
            _ => return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
        };

        Ok(Exam {
            id,
            course_name: self.course_name,
            exam_title: self.exam_title,
            exam_date,
            location: self.location,
            topics: self.topics,
            status: ExamStatus::Upcoming,
            importance: self.importance.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamRequest {
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub exam_title: String,
    #[serde(default, with = "dates::exam_moment_opt")]
    pub exam_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub topics: Option<String>,
    pub status: ExamStatus,
    #[serde(default)]
    pub importance: Importance,
}

impl UpdateExamRequest {
    pub fn apply_to(self, current: &Exam) -> Result<Exam, AppError> {
        let exam_date = match self.exam_date {
            Some(d) if has_text(&self.course_name) && has_text(&self.exam_title) => d,
            _ => return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
        };

        Ok(Exam {
            id: current.id.clone(),
            course_name: self.course_name,
            exam_title: self.exam_title,
            exam_date,
            location: self.location,
            topics: self.topics,
            status: self.status,
            importance: self.importance,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamStatusRequest {
    pub status: ExamStatus,
}
