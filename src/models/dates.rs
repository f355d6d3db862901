use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const EXAM_MOMENT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const EXAM_MOMENT_FORMAT_SECS: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a stored due date as a plain calendar date.
///
/// The value never passes through a UTC instant, so `"2024-03-15"` is March 15
/// whatever the offset of the machine evaluating it.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| AppError::Validation(format!("Invalid due date '{}': {}", value, e)))
}

/// Parse an exam moment in local wall-clock time, with or without seconds.
pub fn parse_exam_moment(value: &str) -> Result<NaiveDateTime, AppError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, EXAM_MOMENT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, EXAM_MOMENT_FORMAT_SECS))
        .map_err(|e| AppError::Validation(format!("Invalid exam date '{}': {}", value, e)))
}

/// Minute precision unless the moment carries seconds, so a parsed value
/// always formats back to something that parses to the same moment.
pub fn format_exam_moment(value: &NaiveDateTime) -> String {
    if value.second() == 0 && value.nanosecond() == 0 {
        value.format(EXAM_MOMENT_FORMAT).to_string()
    } else {
        value.format(EXAM_MOMENT_FORMAT_SECS).to_string()
    }
}

/// Last representable millisecond of the given day.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

/// Whole calendar days from `today` to `date`; negative when `date` is past.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

pub fn tomorrow(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(1))
}

pub fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Serde adapter for exam moments stored as `YYYY-MM-DDTHH:MM`.
pub mod exam_moment {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_exam_moment(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_exam_moment(&raw).map_err(serde::de::Error::custom)
    }
}

/// Same as [`exam_moment`] for optional request fields.
pub mod exam_moment_opt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&super::format_exam_moment(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.trim().is_empty() => super::parse_exam_moment(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Optional due date in request bodies. A blank string, as sent by an empty
/// date input, counts as missing.
pub mod due_date_opt {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(&v.format(super::DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.trim().is_empty() => super::parse_due_date(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date_keeps_calendar_day() {
        let date = parse_due_date("2024-01-01").expect("valid date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let date = parse_due_date("2024-03-15").expect("valid date");
        assert_eq!(date.to_string(), "2024-03-15");
    }

    #[test]
    fn test_parse_due_date_rejects_garbage() {
        assert!(parse_due_date("15/03/2024").is_err());
        assert!(parse_due_date("").is_err());
    }

    #[test]
    fn test_parse_exam_moment_with_and_without_seconds() {
        let a = parse_exam_moment("2024-05-02T09:30").unwrap();
        let b = parse_exam_moment("2024-05-02T09:30:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.format(EXAM_MOMENT_FORMAT).to_string(), "2024-05-02T09:30");
    }

    #[test]
    fn test_format_exam_moment_keeps_seconds() {
        let whole = parse_exam_moment("2024-04-10T14:00").unwrap();
        assert_eq!(format_exam_moment(&whole), "2024-04-10T14:00");

        let with_secs = parse_exam_moment("2024-04-10T14:00:30").unwrap();
        assert_eq!(format_exam_moment(&with_secs), "2024-04-10T14:00:30");
        assert_eq!(parse_exam_moment(&format_exam_moment(&with_secs)).unwrap(), with_secs);
    }

    #[test]
    fn test_end_of_day_sorts_after_any_time_that_day() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let exam = parse_exam_moment("2024-05-02T23:59").unwrap();
        assert!(exam < end_of_day(day));
        assert_eq!(end_of_day(day).date(), day);
    }

    #[test]
    fn test_days_until() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), today), 2);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(), today), -8);
        assert_eq!(tomorrow(today), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
