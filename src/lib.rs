//! # campusd
//!
//! A campus-resource information portal, usable both as a standalone binary
//! and as a library.
//!
//! The server exposes a JSON REST API over classrooms, labs, bus routes,
//! cafeteria menus, weekly schedules, and admin-reviewed booking requests,
//! backed by a single-file SQLite database.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use campusd::server::{AppState, create_router};
//! use campusd::store::SqliteStore;
//!
//! let store = SqliteStore::new("./data/campus.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState { store: Arc::new(store) });
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
