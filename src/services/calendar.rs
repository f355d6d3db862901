use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{Assignment, Exam, dates::DATE_FORMAT};
use crate::services::agenda::AgendaKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub kind: AgendaKind,
    pub id: String,
    pub title: String,
    pub course: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub day: u32,
    pub is_today: bool,
    pub items: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CalendarCell {
    Blank,
    Day(CalendarDay),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub cells: Vec<CalendarCell>,
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Group unfinished records by the raw date component they carry.
///
/// Assignments are keyed by their due date, not the end-of-day moment of the
/// flat agenda. Exams are keyed by the date part of their stored moment.
pub fn bucket_by_date(assignments: &[Assignment], exams: &[Exam]) -> BTreeMap<NaiveDate, Vec<CalendarEntry>> {
    let mut map: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();

    for hw in assignments.iter().filter(|hw| !hw.is_completed()) {
        map.entry(hw.due_date).or_default().push(CalendarEntry {
            kind: AgendaKind::Assignment,
            id: hw.id.clone(),
            title: hw.assignment_title.clone(),
            course: hw.course_name.clone(),
        });
    }

    for ex in exams.iter().filter(|ex| !ex.is_completed()) {
        map.entry(ex.exam_date.date()).or_default().push(CalendarEntry {
            kind: AgendaKind::Exam,
            id: ex.id.clone(),
            title: ex.exam_title.clone(),
            course: ex.course_name.clone(),
        });
    }

    map
}

/// Sunday-first month grid: blank cells up to the weekday of the 1st, then one
/// cell per day of the month.
pub fn month_grid(
    year: i32,
    month: u32,
    today: NaiveDate,
    buckets: &BTreeMap<NaiveDate, Vec<CalendarEntry>>,
) -> Result<CalendarMonth, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("Invalid month {}-{}", year, month)))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::Validation(format!("Invalid month {}-{}", year, month)))?;

    let days_in_month = (next - first).num_days() as usize;
    let leading_blanks = first.weekday().num_days_from_sunday();

    let mut cells: Vec<CalendarCell> = (0..leading_blanks).map(|_| CalendarCell::Blank).collect();
    cells.extend(first.iter_days().take(days_in_month).map(|date| {
        CalendarCell::Day(CalendarDay {
            date: date_key(date),
            day: date.day(),
            is_today: date == today,
            items: buckets.get(&date).cloned().unwrap_or_default(),
        })
    }));

    Ok(CalendarMonth {
        year,
        month,
        leading_blanks,
        cells,
    })
}
