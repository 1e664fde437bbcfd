use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingStatus, MealPeriod, ResourceKind, Role, Weekday};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub student_id: String,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    pub id: String,
    pub name: String,
    pub building: String,
    pub capacity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lab {
    pub id: String,
    pub name: String,
    pub building: String,
    pub capacity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRoute {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stop on a bus route. `position` is the zero-based order along the
/// route; the stop list is always read back ordered by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusStop {
    #[serde(skip)]
    pub bus_id: String,
    pub position: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeteriaMenuItem {
    pub id: String,
    pub day_of_week: Weekday,
    pub meal: MealPeriod,
    pub dish: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeteriaInfo {
    pub id: String,
    pub name: String,
    pub location: String,
    pub opening_hours: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recurring weekly time block attached to a classroom or lab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub resource_type: ResourceKind,
    pub resource_id: String,
    pub day_of_week: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ad-hoc reservation request for a resource on a specific date.
///
/// Created `pending` with the authenticated caller as owner; an admin review
/// moves it to `approved` or `rejected` and stamps the review fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: String,
    pub user_id: String,
    pub resource_type: ResourceKind,
    pub resource_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub program_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<i64>,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
