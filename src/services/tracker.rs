use tracing::info;
use uuid::Uuid;

use crate::db::Store;
use crate::error::AppError;
use crate::models::{
    Assignment, AssignmentStatus, Exam, ExamStatus, NewAssignmentRequest, NewExamRequest,
    UpdateAssignmentRequest, UpdateExamRequest,
};
use crate::services::courses::{self, CourseChange};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub async fn add_assignment(store: &Store, req: NewAssignmentRequest) -> Result<Assignment, AppError> {
    let assignment = req.into_assignment(new_id())?;

    let _guard = store.lock().await;
    let mut assignments = store.assignments().await?;
    assignments.push(assignment.clone());
    store.save_assignments(&assignments).await?;

    info!("Added assignment {} ({})", assignment.id, assignment.course_name);
    Ok(assignment)
}

pub async fn update_assignment(
    store: &Store,
    id: &str,
    req: UpdateAssignmentRequest,
) -> Result<Option<Assignment>, AppError> {
    let _guard = store.lock().await;
    let mut assignments = store.assignments().await?;
    let Some(slot) = assignments.iter_mut().find(|hw| hw.id == id) else {
        return Ok(None);
    };

    // Sent markers are keyed by id only; a due date edit keeps them.
    let updated = req.apply_to(slot)?;
    *slot = updated.clone();
    store.save_assignments(&assignments).await?;

    if updated.is_completed() {
        forget_sent(store, &[updated.id.clone()]).await?;
    }
    Ok(Some(updated))
}

pub async fn set_assignment_status(
    store: &Store,
    id: &str,
    status: AssignmentStatus,
) -> Result<Option<Assignment>, AppError> {
    let _guard = store.lock().await;
    let mut assignments = store.assignments().await?;
    let Some(slot) = assignments.iter_mut().find(|hw| hw.id == id) else {
        return Ok(None);
    };

    slot.status = status;
    let updated = slot.clone();
    store.save_assignments(&assignments).await?;

    if status == AssignmentStatus::Completed {
        forget_sent(store, &[updated.id.clone()]).await?;
    }
    Ok(Some(updated))
}

pub async fn delete_assignment(store: &Store, id: &str) -> Result<bool, AppError> {
    let _guard = store.lock().await;
    let mut assignments = store.assignments().await?;
    let before = assignments.len();
    assignments.retain(|hw| hw.id != id);
    if assignments.len() == before {
        return Ok(false);
    }

    store.save_assignments(&assignments).await?;
    forget_sent(store, &[id.to_string()]).await?;
    info!("Deleted assignment {}", id);
    Ok(true)
}

pub async fn add_exam(store: &Store, req: NewExamRequest) -> Result<Exam, AppError> {
    let exam = req.into_exam(new_id())?;

    let _guard = store.lock().await;
    let mut exams = store.exams().await?;
    exams.push(exam.clone());
    store.save_exams(&exams).await?;

    info!("Added exam {} ({})", exam.id, exam.course_name);
    Ok(exam)
}

pub async fn update_exam(store: &Store, id: &str, req: UpdateExamRequest) -> Result<Option<Exam>, AppError> {
    let _guard = store.lock().await;
    let mut exams = store.exams().await?;
    let Some(slot) = exams.iter_mut().find(|ex| ex.id == id) else {
        return Ok(None);
    };

    let updated = req.apply_to(slot)?;
    *slot = updated.clone();
    store.save_exams(&exams).await?;
    Ok(Some(updated))
}

pub async fn set_exam_status(store: &Store, id: &str, status: ExamStatus) -> Result<Option<Exam>, AppError> {
    let _guard = store.lock().await;
    let mut exams = store.exams().await?;
    let Some(slot) = exams.iter_mut().find(|ex| ex.id == id) else {
        return Ok(None);
    };

    slot.status = status;
    let updated = slot.clone();
    store.save_exams(&exams).await?;
    Ok(Some(updated))
}

pub async fn delete_exam(store: &Store, id: &str) -> Result<bool, AppError> {
    let _guard = store.lock().await;
    let mut exams = store.exams().await?;
    let before = exams.len();
    exams.retain(|ex| ex.id != id);
    if exams.len() == before {
        return Ok(false);
    }

    store.save_exams(&exams).await?;
    info!("Deleted exam {}", id);
    Ok(true)
}

pub async fn course_names(store: &Store) -> Result<Vec<String>, AppError> {
    let assignments = store.assignments().await?;
    let exams = store.exams().await?;
    Ok(courses::course_names(&assignments, &exams))
}

pub async fn rename_course(store: &Store, old: &str, new: &str) -> Result<CourseChange, AppError> {
    let _guard = store.lock().await;
    let mut assignments = store.assignments().await?;
    let mut exams = store.exams().await?;

    let change = courses::rename_course(&mut assignments, &mut exams, old, new);
    if change.assignments > 0 {
        store.save_assignments(&assignments).await?;
    }
    if change.exams > 0 {
        store.save_exams(&exams).await?;
    }

    info!(
        "Renamed course '{}' -> '{}' on {} assignments, {} exams",
        old,
        new.trim(),
        change.assignments,
        change.exams
    );
    Ok(change)
}

pub async fn delete_course(store: &Store, name: &str) -> Result<CourseChange, AppError> {
    let _guard = store.lock().await;
    let mut assignments = store.assignments().await?;
    let mut exams = store.exams().await?;

    let (change, removed_ids) = courses::delete_course(&mut assignments, &mut exams, name);
    if change.assignments > 0 {
        store.save_assignments(&assignments).await?;
        forget_sent(store, &removed_ids).await?;
    }
    if change.exams > 0 {
        store.save_exams(&exams).await?;
    }

    info!(
        "Deleted course '{}': {} assignments, {} exams",
        name, change.assignments, change.exams
    );
    Ok(change)
}

/// Drop sent-reminder markers. Caller holds the store lock.
async fn forget_sent(store: &Store, ids: &[String]) -> Result<(), AppError> {
    let mut sent = store.sent_notifications().await?;
    let mut removed = false;
    for id in ids {
        removed |= sent.remove(id);
    }
    if removed {
        store.save_sent_notifications(&sent).await?;
    }
    Ok(())
}
