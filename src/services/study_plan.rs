use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info};

use crate::error::AppError;
use crate::gemini::TextGenerator;
use crate::models::{Assignment, AssignmentStatus, Importance};

pub const ALL_DONE_MESSAGE: &str =
    "Great job! You've completed all your homework. Take a well-deserved break!";
pub const FAILURE_MESSAGE: &str =
    "Sorry, I couldn't generate study tips at the moment. Please check your API key and try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyPlanItem {
    pub course: String,
    pub assignment: String,
    pub due: NaiveDate,
    pub status: AssignmentStatus,
    pub importance: Importance,
}

pub fn plan_items(assignments: &[Assignment]) -> Vec<StudyPlanItem> {
    assignments
        .iter()
        .filter(|hw| !hw.is_completed())
        .map(|hw| StudyPlanItem {
            course: hw.course_name.clone(),
            assignment: hw.assignment_title.clone(),
            due: hw.due_date,
            status: hw.status,
            importance: hw.importance,
        })
        .collect()
}

pub fn build_prompt(items: &[StudyPlanItem], today: NaiveDate) -> Result<String, AppError> {
    let list = serde_json::to_string_pretty(items)?;
    Ok(format!(
        "You are an expert academic advisor for a college student.\n\
         Based on the following homework list, which includes an importance level, \
         provide a prioritized study plan and actionable tips to help me stay on track.\n\
         Factor in due dates and importance levels to create the most effective plan.\n\
         Organize your response clearly using Markdown: headings for sections, bullet points \
         for lists, and bold text for emphasis. For each assignment, suggest a concrete first \
         step to overcome procrastination.\n\
         Keep the advice concise, encouraging, and easy to read.\n\n\
         Today's date is {}.\n\n\
         Here is my homework list:\n{}\n",
        today.format("%A, %B %-d, %Y"),
        list
    ))
}

/// Produces the markdown study plan. Never fails: an empty list and an
/// upstream failure both map to fixed messages.
pub struct StudyPlanService {
    generator: Arc<dyn TextGenerator>,
    loading: AtomicBool,
}

impl StudyPlanService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn study_plan(&self, assignments: &[Assignment], today: NaiveDate) -> String {
        let items = plan_items(assignments);
        if items.is_empty() {
            return ALL_DONE_MESSAGE.to_string();
        }

        self.loading.store(true, Ordering::SeqCst);
        let result = match build_prompt(&items, today) {
            Ok(prompt) => self.generator.generate(&prompt).await,
            Err(e) => Err(e),
        };
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(text) => {
                info!("Generated study plan for {} assignments", items.len());
                text
            }
            Err(e) => {
                error!("Error generating study plan: {}", e);
                FAILURE_MESSAGE.to_string()
            }
        }
    }
}
