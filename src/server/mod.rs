mod auth;
mod bookings;
mod buses;
mod catalog;
pub mod dto;
pub mod response;
mod router;
mod schedules;
pub mod validation;

pub use router::{AppState, create_router};
