pub mod assignment;
pub mod dates;
pub mod exam;
pub mod importance;
pub mod settings;

pub use assignment::{
    Assignment, AssignmentStatus, AssignmentStatusRequest, NewAssignmentRequest,
    UpdateAssignmentRequest,
};
pub use exam::{Exam, ExamStatus, ExamStatusRequest, NewExamRequest, UpdateExamRequest};
pub use importance::Importance;
pub use settings::{DefaultView, SentNotifications, Settings, UpdateSettingsRequest};
