mod fields;
mod models;

pub use fields::{BookingStatus, MealPeriod, ResourceKind, Role, Weekday};
pub use models::*;
