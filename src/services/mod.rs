pub mod agenda;
pub mod calendar;
pub mod courses;
pub mod reminders;
pub mod study_plan;
pub mod tracker;

pub use agenda::{AgendaItem, AgendaKind, Countdown};
pub use calendar::{CalendarCell, CalendarDay, CalendarMonth};
pub use courses::{CourseChange, RenameCourseRequest};
pub use reminders::ReminderScheduler;
pub use study_plan::StudyPlanService;
