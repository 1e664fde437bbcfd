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
use crate::server::dto::{CreateBookingRequest, ListBookingsParams, UpdateBookingStatusRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{require_nonempty, validate_date, validate_time_range};
use crate::store::BookingFilter;
use crate::types::{BookingRequest, BookingStatus, Role};

/// Creates a request in `pending` state owned by the caller. The body has no
/// owner field at all, so a client cannot file a request on behalf of
/// someone else.
pub async fn create(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    require_nonempty(&req.program_name, "program_name").map_err(ApiError::bad_request)?;
    validate_date(&req.date, "date").map_err(ApiError::bad_request)?;
    validate_time_range(&req.start_time, &req.end_time).map_err(ApiError::bad_request)?;
    if let Some(count) = req.participant_count {
        if count <= 0 {
            return Err(ApiError::bad_request("participant_count must be positive"));
        }
    }

    let exists = state
        .store
        .resource_exists(req.resource_type, &req.resource_id)
        .api_err("Failed to check resource")?;
    if !exists {
        return Err(ApiError::not_found("Resource not found"));
    }

    let now = Utc::now();
    let booking = BookingRequest {
        id: Uuid::new_v4().to_string(),
        user_id: auth.user.id,
        resource_type: req.resource_type,
        resource_id: req.resource_id,
        date: req.date,
        start_time: req.start_time,
        end_time: req.end_time,
        program_name: req.program_name,
        description: req.description,
        participant_count: req.participant_count,
        status: BookingStatus::Pending,
        admin_notes: None,
        reviewed_by: None,
        reviewed_at: None,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_booking(&booking)
        .api_err("Failed to create booking request")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(booking))))
}

/// Admins see every request. Students see their own, with one exception:
/// asking for `status=approved` returns all approved requests system-wide so
/// anyone can inspect what has already been granted.
pub async fn list(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListBookingsParams>,
) -> impl IntoResponse {
    let is_admin = auth.user.role == Role::Admin;

    let owner = if is_admin || params.status == Some(BookingStatus::Approved) {
        None
    } else {
        Some(auth.user.id.clone())
    };

    let filter = BookingFilter {
        status: params.status,
        resource_type: params.resource_type,
        resource_id: params.resource_id,
        owner,
    };

    let bookings = state
        .store
        .list_bookings(&filter)
        .api_err("Failed to list booking requests")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(bookings)))
}

pub async fn get(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let booking = state
        .store
        .get_booking(&id)
        .api_err("Failed to get booking request")?
        .or_not_found("Booking request not found")?;

    let visible = auth.user.role == Role::Admin
        || booking.status == BookingStatus::Approved
        || booking.user_id == auth.user.id;
    if !visible {
        return Err(ApiError::forbidden("Not allowed to view this request"));
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(booking)))
}

/// Admin review. Approving or rejecting stamps the reviewer and timestamp;
/// a later review overwrites an earlier one.
pub async fn update_status(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBookingStatusRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    if req.status == BookingStatus::Pending {
        return Err(ApiError::bad_request(
            "status must be approved or rejected",
        ));
    }

    state
        .store
        .get_booking(&id)
        .api_err("Failed to get booking request")?
        .or_not_found("Booking request not found")?;

    state
        .store
        .review_booking(&id, req.status, req.admin_notes.as_deref(), &admin.user.id)
        .api_err("Failed to update booking request")?;

    let booking = state
        .store
        .get_booking(&id)
        .api_err("Failed to get booking request")?
        .or_not_found("Booking request not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(booking)))
}

/// Admins can delete any request; a student can withdraw their own request
/// only while it is still pending.
pub async fn delete(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let booking = state
        .store
        .get_booking(&id)
        .api_err("Failed to get booking request")?
        .or_not_found("Booking request not found")?;

    if auth.user.role != Role::Admin {
        if booking.user_id != auth.user.id {
            return Err(ApiError::forbidden("Not allowed to delete this request"));
        }
        if booking.status != BookingStatus::Pending {
            return Err(ApiError::bad_request(
                "Only pending requests can be withdrawn",
            ));
        }
    }

    state
        .store
        .delete_booking(&booking.id)
        .api_err("Failed to delete booking request")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
