use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Assignment, Exam};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameCourseRequest {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseChange {
    pub assignments: usize,
    pub exams: usize,
}

/// Distinct trimmed course names across both collections, sorted.
pub fn course_names(assignments: &[Assignment], exams: &[Exam]) -> Vec<String> {
    let set: BTreeSet<&str> = assignments
        .iter()
        .map(|hw| hw.course_name.trim())
        .chain(exams.iter().map(|ex| ex.course_name.trim()))
        .filter(|name| !name.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// Rewrite `old` to the trimmed `new` wherever it matches exactly.
///
/// Leaves everything untouched when `new` is blank, equal to `old`, or `old`
/// is not used by any record.
pub fn rename_course(
    assignments: &mut [Assignment],
    exams: &mut [Exam],
    old: &str,
    new: &str,
) -> CourseChange {
    let new = new.trim();
    if new.is_empty() || new == old {
        return CourseChange::default();
    }

    let mut change = CourseChange::default();
    for hw in assignments.iter_mut().filter(|hw| hw.course_name == old) {
        hw.course_name = new.to_string();
        change.assignments += 1;
    }
    for ex in exams.iter_mut().filter(|ex| ex.course_name == old) {
        ex.course_name = new.to_string();
        change.exams += 1;
    }
    change
}

/// Drop every record filed under `name`. Returns the removed assignment ids
/// alongside the counts so callers can clean up per-assignment state.
pub fn delete_course(
    assignments: &mut Vec<Assignment>,
    exams: &mut Vec<Exam>,
    name: &str,
) -> (CourseChange, Vec<String>) {
    let removed_ids: Vec<String> = assignments
        .iter()
        .filter(|hw| hw.course_name == name)
        .map(|hw| hw.id.clone())
        .collect();

    assignments.retain(|hw| hw.course_name != name);
    let exams_before = exams.len();
    exams.retain(|ex| ex.course_name != name);

    let change = CourseChange {
        assignments: removed_ids.len(),
        exams: exams_before - exams.len(),
    };
    (change, removed_ids)
}
