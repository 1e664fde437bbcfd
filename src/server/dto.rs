use serde::{Deserialize, Serialize};

use crate::types::{BookingStatus, BusRoute, BusStop, MealPeriod, ResourceKind, User, Weekday};

// Auth

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub student_id: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub student_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

// Catalogs

#[derive(Debug, Deserialize)]
pub struct CreateClassroomRequest {
    pub name: String,
    pub building: String,
    pub capacity: i64,
    #[serde(default)]
    pub facilities: Option<String>,
}

/// Update requests are merge-patches: every field is optional and omitted
/// fields keep their stored value. There is no way to null out an optional
/// field once set, short of recreating the record.
#[derive(Debug, Deserialize)]
pub struct UpdateClassroomRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub facilities: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLabRequest {
    pub name: String,
    pub building: String,
    pub capacity: i64,
    #[serde(default)]
    pub equipment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLabRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub equipment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuItemRequest {
    pub day_of_week: Weekday,
    pub meal: MealPeriod,
    pub dish: String,
    #[serde(default)]
    pub price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuItemRequest {
    #[serde(default)]
    pub day_of_week: Option<Weekday>,
    #[serde(default)]
    pub meal: Option<MealPeriod>,
    #[serde(default)]
    pub dish: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCafeteriaInfoRequest {
    pub name: String,
    pub location: String,
    pub opening_hours: String,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCafeteriaInfoRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

// Buses

#[derive(Debug, Deserialize)]
pub struct BusStopInput {
    pub name: String,
    #[serde(default)]
    pub arrival_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBusRouteRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stops: Vec<BusStopInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBusRouteRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stops: Option<Vec<BusStopInput>>,
}

#[derive(Debug, Serialize)]
pub struct BusRouteResponse {
    #[serde(flatten)]
    pub route: BusRoute,
    pub stops: Vec<BusStop>,
}

// Schedules

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default)]
    pub day: Option<Weekday>,
}

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub resource_type: ResourceKind,
    pub resource_id: String,
    pub day_of_week: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    #[serde(default)]
    pub day_of_week: Option<Weekday>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

// Booking requests

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub resource_type: ResourceKind,
    pub resource_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub program_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub participant_count: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsParams {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub resource_type: Option<ResourceKind>,
    #[serde(default)]
    pub resource_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
}
