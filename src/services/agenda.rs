use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::models::{Assignment, Exam, Importance, dates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgendaKind {
    Assignment,
    Exam,
}

/// Countdown label shown next to each agenda row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    DaysAway(i64),
    Tomorrow,
    Today,
    Overdue,
}

impl Countdown {
    pub fn from_days(days_until: i64) -> Self {
        match days_until {
            d if d > 1 => Countdown::DaysAway(d),
            1 => Countdown::Tomorrow,
            0 => Countdown::Today,
            _ => Countdown::Overdue,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::DaysAway(d) => write!(f, "{} days away", d),
            Countdown::Tomorrow => f.write_str("Tomorrow"),
            Countdown::Today => f.write_str("Today"),
            Countdown::Overdue => f.write_str("Overdue"),
        }
    }
}

impl Serialize for Countdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    pub kind: AgendaKind,
    pub id: String,
    pub title: String,
    pub course: String,
    pub due_moment: NaiveDateTime,
    pub days_until: i64,
    pub countdown: Countdown,
}

/// Moment an assignment is ordered by: the last millisecond of its due day,
/// so an exam at any time on the same day comes first.
pub fn assignment_moment(assignment: &Assignment) -> NaiveDateTime {
    dates::end_of_day(assignment.due_date)
}

/// Flat chronological agenda of everything not yet completed.
///
/// Assignments are laid out before exams and the sort is stable, so equal
/// moments keep collection order.
pub fn build_agenda(assignments: &[Assignment], exams: &[Exam], today: NaiveDate) -> Vec<AgendaItem> {
    let homework_items = assignments
        .iter()
        .filter(|hw| !hw.is_completed())
        .map(|hw| (AgendaKind::Assignment, &hw.id, &hw.assignment_title, &hw.course_name, assignment_moment(hw)));

    let exam_items = exams
        .iter()
        .filter(|ex| !ex.is_completed())
        .map(|ex| (AgendaKind::Exam, &ex.id, &ex.exam_title, &ex.course_name, ex.exam_date));

    let mut items: Vec<AgendaItem> = homework_items
        .chain(exam_items)
        .map(|(kind, id, title, course, due_moment)| {
            let days_until = dates::days_until(due_moment.date(), today);
            AgendaItem {
                kind,
                id: id.clone(),
                title: title.clone(),
                course: course.clone(),
                due_moment,
                days_until,
                countdown: Countdown::from_days(days_until),
            }
        })
        .collect();

    items.sort_by_key(|item| item.due_moment);
    items
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportanceGroup {
    pub importance: Importance,
    pub assignments: Vec<Assignment>,
}

/// Assignments sorted by due date and split into High, Medium and Low groups.
/// Empty groups are left out.
pub fn group_by_importance(assignments: &[Assignment]) -> Vec<ImportanceGroup> {
    let mut sorted: Vec<&Assignment> = assignments.iter().collect();
    sorted.sort_by_key(|hw| hw.due_date);

    Importance::ORDER
        .iter()
        .map(|level| ImportanceGroup {
            importance: *level,
            assignments: sorted
                .iter()
                .filter(|hw| hw.importance == *level)
                .map(|hw| (*hw).clone())
                .collect(),
        })
        .filter(|group| !group.assignments.is_empty())
        .collect()
}

pub fn sort_exams(exams: &[Exam]) -> Vec<Exam> {
    let mut sorted = exams.to_vec();
    sorted.sort_by_key(|ex| ex.exam_date);
    sorted
}
