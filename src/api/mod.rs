use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{patch, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::models::dates;
use crate::models::*;
use crate::notify::Permission;
use crate::services::agenda::{self, ImportanceGroup};
use crate::services::{AgendaItem, CalendarMonth, CourseChange, RenameCourseRequest, calendar, tracker};
use crate::state::AppState;

#[derive(Deserialize)]
struct AgendaParams {
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct CalendarParams {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    month: Option<u32>,
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationStatus {
    permission: Permission,
    notifications_enabled: bool,
}

#[derive(Serialize)]
struct ReminderCheckResponse {
    sent: usize,
}

#[derive(Serialize)]
struct StudyPlanResponse {
    plan: String,
}

#[derive(Serialize)]
struct StudyPlanStatus {
    loading: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/assignments", get(list_assignments).post(create_assignment))
        .route("/assignments/grouped", get(grouped_assignments))
        .route("/assignments/{id}", put(update_assignment).delete(delete_assignment))
        .route("/assignments/{id}/status", patch(update_assignment_status))
        .route("/exams", get(list_exams).post(create_exam))
        .route("/exams/{id}", put(update_exam).delete(delete_exam))
        .route("/exams/{id}/status", patch(update_exam_status))
        .route("/courses", get(list_courses))
        .route("/courses/rename", post(rename_course))
        .route("/courses/{name}", axum::routing::delete(delete_course))
        .route("/agenda", get(agenda_list))
        .route("/agenda/calendar", get(agenda_calendar))
        .route("/settings", get(get_settings).patch(update_settings))
        .route("/notifications", get(notification_status))
        .route("/notifications/permission", post(request_permission))
        .route("/reminders/check", post(check_reminders))
        .route("/study-plan", post(study_plan))
        .route("/study-plan/status", get(study_plan_status))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(state.store.pool()).await?;
    Ok(StatusCode::OK)
}

/// Re-run the due-tomorrow check after a relevant change. A failing check is
/// logged and never fails the request that triggered it.
async fn refresh_reminders(state: &AppState) {
    if let Err(e) = state.reminders.evaluate(dates::today_local()).await {
        warn!("Reminder check after update failed: {:?}", e);
    }
}

async fn list_assignments(State(state): State<AppState>) -> Result<Json<Vec<Assignment>>, AppError> {
    let assignments = state.store.assignments().await?;
    Ok(Json(assignments))
}

async fn grouped_assignments(State(state): State<AppState>) -> Result<Json<Vec<ImportanceGroup>>, AppError> {
    let assignments = state.store.assignments().await?;
    Ok(Json(agenda::group_by_importance(&assignments)))
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(req): Json<NewAssignmentRequest>
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = tracker::add_assignment(&state.store, req).await?;
    refresh_reminders(&state).await;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAssignmentRequest>
) -> Result<Json<Assignment>, AppError> {
    let assignment = tracker::update_assignment(&state.store, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    refresh_reminders(&state).await;
    Ok(Json(assignment))
}

async fn update_assignment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignmentStatusRequest>
) -> Result<Json<Assignment>, AppError> {
    let assignment = tracker::set_assignment_status(&state.store, &id, req.status)
        .await?
        .ok_or(AppError::NotFound)?;
    refresh_reminders(&state).await;
    Ok(Json(assignment))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    if tracker::delete_assignment(&state.store, &id).await? {
        refresh_reminders(&state).await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_exams(State(state): State<AppState>) -> Result<Json<Vec<Exam>>, AppError> {
    let exams = state.store.exams().await?;
    Ok(Json(agenda::sort_exams(&exams)))
}

async fn create_exam(
    State(state): State<AppState>,
    Json(req): Json<NewExamRequest>
) -> Result<(StatusCode, Json<Exam>), AppError> {
    let exam = tracker::add_exam(&state.store, req).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

async fn update_exam(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateExamRequest>
) -> Result<Json<Exam>, AppError> {
    let exam = tracker::update_exam(&state.store, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(exam))
}

async fn update_exam_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ExamStatusRequest>
) -> Result<Json<Exam>, AppError> {
    let exam = tracker::set_exam_status(&state.store, &id, req.status)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(exam))
}

async fn delete_exam(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    if tracker::delete_exam(&state.store, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let names = tracker::course_names(&state.store).await?;
    Ok(Json(names))
}

async fn rename_course(
    State(state): State<AppState>,
    Json(req): Json<RenameCourseRequest>
) -> Result<Json<CourseChange>, AppError> {
    let change = tracker::rename_course(&state.store, &req.old_name, &req.new_name).await?;
    if change.assignments > 0 {
        refresh_reminders(&state).await;
    }
    Ok(Json(change))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(name): Path<String>
) -> Result<Json<CourseChange>, AppError> {
    let change = tracker::delete_course(&state.store, &name).await?;
    if change.assignments > 0 {
        refresh_reminders(&state).await;
    }
    Ok(Json(change))
}

async fn agenda_list(
    State(state): State<AppState>,
    Query(params): Query<AgendaParams>
) -> Result<Json<Vec<AgendaItem>>, AppError> {
    let today = params.today.unwrap_or_else(dates::today_local);
    let assignments = state.store.assignments().await?;
    let exams = state.store.exams().await?;
    Ok(Json(agenda::build_agenda(&assignments, &exams, today)))
}

async fn agenda_calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>
) -> Result<Json<CalendarMonth>, AppError> {
    let today = params.today.unwrap_or_else(dates::today_local);
    let year = params.year.unwrap_or(today.year());
    let month = params.month.unwrap_or(today.month());

    let assignments = state.store.assignments().await?;
    let exams = state.store.exams().await?;
    let buckets = calendar::bucket_by_date(&assignments, &exams);
    Ok(Json(calendar::month_grid(year, month, today, &buckets)?))
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, AppError> {
    Ok(Json(state.store.settings().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>
) -> Result<Json<Settings>, AppError> {
    if let Some(name) = &req.user_name {
        state.store.save_user_name(name).await?;
    }
    if let Some(view) = req.default_view {
        state.store.save_default_view(view).await?;
    }
    if let Some(enabled) = req.notifications_enabled {
        state.store.save_notifications_enabled(enabled).await?;
        refresh_reminders(&state).await;
    }
    Ok(Json(state.store.settings().await?))
}

async fn notification_status(State(state): State<AppState>) -> Result<Json<NotificationStatus>, AppError> {
    Ok(Json(NotificationStatus {
        permission: state.reminders.notifier().permission(),
        notifications_enabled: state.store.notifications_enabled().await?,
    }))
}

async fn request_permission(State(state): State<AppState>) -> Result<Json<NotificationStatus>, AppError> {
    let permission = state.reminders.notifier().request_permission().await;
    if permission == Permission::Granted {
        state.store.save_notifications_enabled(true).await?;
        refresh_reminders(&state).await;
    }

    Ok(Json(NotificationStatus {
        permission,
        notifications_enabled: state.store.notifications_enabled().await?,
    }))
}

async fn check_reminders(State(state): State<AppState>) -> Result<Json<ReminderCheckResponse>, AppError> {
    let sent = state.reminders.evaluate(dates::today_local()).await?;
    Ok(Json(ReminderCheckResponse { sent }))
}

async fn study_plan(State(state): State<AppState>) -> Result<Json<StudyPlanResponse>, AppError> {
    let assignments = state.store.assignments().await?;
    let plan = state.study_plan.study_plan(&assignments, dates::today_local()).await;
    Ok(Json(StudyPlanResponse { plan }))
}

async fn study_plan_status(State(state): State<AppState>) -> Json<StudyPlanStatus> {
    Json(StudyPlanStatus {
        loading: state.study_plan.is_loading(),
    })
}
