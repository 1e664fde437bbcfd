mod catalog;
mod schema;
mod seed;
mod sqlite;

pub use catalog::CatalogRecord;
pub use seed::seed_sample_data;
pub use sqlite::{BookingFilter, SqliteStore};
