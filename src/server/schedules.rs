use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireAuth};
use crate::server::AppState;
use crate::server::dto::{CreateScheduleRequest, ScheduleQuery, UpdateScheduleRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{require_nonempty, validate_time_range};
use crate::types::{ResourceKind, ScheduleEntry};

/// Weekly timetable for one classroom or lab, optionally narrowed to a day.
pub async fn list_for_resource(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((resource_type, resource_id)): Path<(ResourceKind, String)>,
    Query(query): Query<ScheduleQuery>,
) -> impl IntoResponse {
    let exists = state
        .store
        .resource_exists(resource_type, &resource_id)
        .api_err("Failed to check resource")?;
    if !exists {
        return Err(ApiError::not_found("Resource not found"));
    }

    let entries = state
        .store
        .list_schedules(resource_type, &resource_id, query.day)
        .api_err("Failed to list schedules")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(entries)))
}

pub async fn create(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateScheduleRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    require_nonempty(&req.subject, "subject").map_err(ApiError::bad_request)?;
    validate_time_range(&req.start_time, &req.end_time).map_err(ApiError::bad_request)?;

    let exists = state
        .store
        .resource_exists(req.resource_type, &req.resource_id)
        .api_err("Failed to check resource")?;
    if !exists {
        return Err(ApiError::not_found("Resource not found"));
    }

    let now = Utc::now();
    let entry = ScheduleEntry {
        id: Uuid::new_v4().to_string(),
        resource_type: req.resource_type,
        resource_id: req.resource_id,
        day_of_week: req.day_of_week,
        start_time: req.start_time,
        end_time: req.end_time,
        subject: req.subject,
        instructor: req.instructor,
        course_code: req.course_code,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_schedule(&entry)
        .api_err("Failed to create schedule entry")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(entry))))
}

pub async fn update(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateScheduleRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut entry = state
        .store
        .get_schedule(&id)
        .api_err("Failed to get schedule entry")?
        .or_not_found("Schedule entry not found")?;

    if let Some(day) = req.day_of_week {
        entry.day_of_week = day;
    }
    if let Some(start_time) = req.start_time {
        entry.start_time = start_time;
    }
    if let Some(end_time) = req.end_time {
        entry.end_time = end_time;
    }
    if let Some(subject) = req.subject {
        require_nonempty(&subject, "subject").map_err(ApiError::bad_request)?;
        entry.subject = subject;
    }
    if let Some(instructor) = req.instructor {
        entry.instructor = Some(instructor);
    }
    if let Some(course_code) = req.course_code {
        entry.course_code = Some(course_code);
    }
    validate_time_range(&entry.start_time, &entry.end_time).map_err(ApiError::bad_request)?;
    entry.updated_at = Utc::now();

    state
        .store
        .update_schedule(&entry)
        .api_err("Failed to update schedule entry")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(entry)))
}

pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_schedule(&id)
        .api_err("Failed to delete schedule entry")?;

    if !deleted {
        return Err(ApiError::not_found("Schedule entry not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
