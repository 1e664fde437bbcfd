use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, post, put},
};

use super::{auth, bookings, buses, catalog, schedules};
use crate::store::SqliteStore;
use crate::types::{CafeteriaInfo, CafeteriaMenuItem, Classroom, Lab};

pub struct AppState {
    pub store: Arc<SqliteStore>,
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn catalog_routes<R: catalog::CatalogResource>(path: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(path, get(catalog::list::<R>).post(catalog::create::<R>))
        .route(
            &format!("{path}/{{id}}"),
            get(catalog::get::<R>)
                .put(catalog::update::<R>)
                .delete(catalog::delete::<R>),
        )
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Access
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signout", post(auth::signout))
        .route("/auth/me", get(auth::me))
        .route("/auth/users", get(auth::list_users))
        // Catalogs
        .merge(catalog_routes::<Classroom>("/classrooms"))
        .merge(catalog_routes::<Lab>("/labs"))
        .merge(catalog_routes::<CafeteriaMenuItem>("/cafeteria/menu"))
        .merge(catalog_routes::<CafeteriaInfo>("/cafeteria/info"))
        // Bus routes carry their ordered stop lists
        .route("/buses", get(buses::list_routes).post(buses::create_route))
        .route(
            "/buses/{id}",
            get(buses::get_route)
                .put(buses::update_route)
                .delete(buses::delete_route),
        )
        // Weekly schedules
        .route("/schedules", post(schedules::create))
        .route(
            "/schedules/{id}",
            put(schedules::update).delete(schedules::delete),
        )
        .route(
            "/schedules/{resource_type}/{resource_id}",
            get(schedules::list_for_resource),
        )
        // Booking request workflow
        .route(
            "/booking-requests",
            get(bookings::list).post(bookings::create),
        )
        .route(
            "/booking-requests/{id}",
            get(bookings::get).delete(bookings::delete),
        )
        .route("/booking-requests/{id}/status", put(bookings::update_status));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
