use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireAuth};
use crate::server::AppState;
use crate::server::dto::{
    BusRouteResponse, BusStopInput, CreateBusRouteRequest, UpdateBusRouteRequest,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{require_nonempty, validate_time};
use crate::types::{BusRoute, BusStop};

fn build_stops(bus_id: &str, inputs: Vec<BusStopInput>) -> Result<Vec<BusStop>, ApiError> {
    let mut stops = Vec::with_capacity(inputs.len());
    for (position, input) in inputs.into_iter().enumerate() {
        require_nonempty(&input.name, "stop name").map_err(ApiError::bad_request)?;
        if let Some(ref arrival) = input.arrival_time {
            validate_time(arrival, "arrival_time").map_err(ApiError::bad_request)?;
        }
        stops.push(BusStop {
            bus_id: bus_id.to_string(),
            position: position as i64,
            name: input.name,
            arrival_time: input.arrival_time,
        });
    }
    Ok(stops)
}

fn route_with_stops(state: &Arc<AppState>, route: BusRoute) -> Result<BusRouteResponse, ApiError> {
    let stops = state
        .store
        .list_bus_stops(&route.id)
        .api_err("Failed to list bus stops")?;
    Ok(BusRouteResponse { route, stops })
}

pub async fn list_routes(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let routes: Vec<BusRoute> = state
        .store
        .catalog_list()
        .api_err("Failed to list bus routes")?;

    let responses = routes
        .into_iter()
        .map(|r| route_with_stops(&state, r))
        .collect::<Result<Vec<_>, _>>()?;

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_route(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let route: BusRoute = state
        .store
        .catalog_get(&id)
        .api_err("Failed to get bus route")?
        .or_not_found("Bus route not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(route_with_stops(&state, route)?)))
}

pub async fn create_route(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateBusRouteRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    require_nonempty(&req.name, "name").map_err(ApiError::bad_request)?;

    let now = Utc::now();
    let route = BusRoute {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        description: req.description,
        created_at: now,
        updated_at: now,
    };
    let stops = build_stops(&route.id, req.stops)?;

    state
        .store
        .catalog_insert(&route)
        .api_err("Failed to create bus route")?;
    state
        .store
        .set_bus_stops(&route.id, &stops)
        .api_err("Failed to set bus stops")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(BusRouteResponse { route, stops })),
    ))
}

pub async fn update_route(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBusRouteRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut route: BusRoute = state
        .store
        .catalog_get(&id)
        .api_err("Failed to get bus route")?
        .or_not_found("Bus route not found")?;

    if let Some(name) = req.name {
        require_nonempty(&name, "name").map_err(ApiError::bad_request)?;
        route.name = name;
    }
    if let Some(description) = req.description {
        route.description = Some(description);
    }
    route.updated_at = Utc::now();

    state
        .store
        .catalog_update(&route)
        .api_err("Failed to update bus route")?;

    if let Some(inputs) = req.stops {
        let stops = build_stops(&route.id, inputs)?;
        state
            .store
            .set_bus_stops(&route.id, &stops)
            .api_err("Failed to set bus stops")?;
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(route_with_stops(&state, route)?)))
}

pub async fn delete_route(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .catalog_delete::<BusRoute>(&id)
        .api_err("Failed to delete bus route")?;

    if !deleted {
        return Err(ApiError::not_found("Bus route not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
