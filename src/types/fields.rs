use std::fmt;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Caller role. Signup always produces `Student`; the single `Admin` account
/// is created at bootstrap and never via the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// The polymorphic resource target of schedules and booking requests.
/// Each kind maps to its own table; the typed lookup replaces the raw
/// string pair and lets callers verify the referenced row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Classroom,
    Lab,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Classroom => "classroom",
            ResourceKind::Lab => "lab",
        }
    }

    /// Table holding rows of this kind.
    #[must_use]
    pub fn table(&self) -> &'static str {
        match self {
            ResourceKind::Classroom => "classrooms",
            ResourceKind::Lab => "labs",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classroom" => Ok(ResourceKind::Classroom),
            "lab" => Ok(ResourceKind::Lab),
            other => Err(format!("unknown resource type '{other}'")),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the recurring weekly schedule. Stored as its week index (Monday = 0)
/// so a plain ORDER BY sorts in week order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    #[must_use]
    pub fn index(&self) -> i64 {
        *self as i64
    }

    pub fn from_index(i: i64) -> Result<Self, String> {
        match i {
            0 => Ok(Weekday::Monday),
            1 => Ok(Weekday::Tuesday),
            2 => Ok(Weekday::Wednesday),
            3 => Ok(Weekday::Thursday),
            4 => Ok(Weekday::Friday),
            5 => Ok(Weekday::Saturday),
            6 => Ok(Weekday::Sunday),
            other => Err(format!("day index {other} out of range")),
        }
    }
}

/// Meal slot on the cafeteria menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealPeriod {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealPeriod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MealPeriod::Breakfast => "breakfast",
            MealPeriod::Lunch => "lunch",
            MealPeriod::Dinner => "dinner",
        }
    }
}

impl FromStr for MealPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealPeriod::Breakfast),
            "lunch" => Ok(MealPeriod::Lunch),
            "dinner" => Ok(MealPeriod::Dinner),
            other => Err(format!("unknown meal period '{other}'")),
        }
    }
}

/// Booking request lifecycle. Requests are created `Pending`; only an admin
/// review moves them to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

macro_rules! text_sql_impls {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

text_sql_impls!(Role);
text_sql_impls!(ResourceKind);
text_sql_impls!(MealPeriod);
text_sql_impls!(BookingStatus);

impl ToSql for Weekday {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.index()))
    }
}

impl FromSql for Weekday {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Weekday::from_index(value.as_i64()?).map_err(|e| FromSqlError::Other(e.into()))
    }
}
