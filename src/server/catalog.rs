use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireAuth};
use crate::server::AppState;
use crate::server::dto::{
    CreateCafeteriaInfoRequest, CreateClassroomRequest, CreateLabRequest, CreateMenuItemRequest,
    UpdateCafeteriaInfoRequest, UpdateClassroomRequest, UpdateLabRequest, UpdateMenuItemRequest,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::require_nonempty;
use crate::store::CatalogRecord;
use crate::types::{CafeteriaInfo, CafeteriaMenuItem, Classroom, Lab};

/// Catalog rows that can be served by the generic handlers below: one set of
/// list/get/create/update/delete handlers, instantiated per record type in
/// the router instead of four copy-pasted services.
pub trait CatalogResource: CatalogRecord + Serialize + 'static {
    type Create: DeserializeOwned + Send + 'static;
    type Update: DeserializeOwned + Send + 'static;

    const NOT_FOUND: &'static str;

    fn build(req: Self::Create) -> Result<Self, String>;

    /// Merges a partial update into the record. Fields omitted from the
    /// request are left untouched, so optional columns can be replaced but
    /// not cleared back to null through the update endpoint.
    fn apply(&mut self, req: Self::Update) -> Result<(), String>;
}

pub async fn list<R: CatalogResource>(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let records: Vec<R> = state
        .store
        .catalog_list()
        .api_err("Failed to list records")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(records)))
}

pub async fn get<R: CatalogResource>(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let record: R = state
        .store
        .catalog_get(&id)
        .api_err("Failed to get record")?
        .or_not_found(R::NOT_FOUND)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(record)))
}

pub async fn create<R: CatalogResource>(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    body: Result<Json<R::Create>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let record = R::build(req).map_err(ApiError::bad_request)?;

    state
        .store
        .catalog_insert(&record)
        .api_err("Failed to create record")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

pub async fn update<R: CatalogResource>(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<R::Update>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut record: R = state
        .store
        .catalog_get(&id)
        .api_err("Failed to get record")?
        .or_not_found(R::NOT_FOUND)?;

    record.apply(req).map_err(ApiError::bad_request)?;

    state
        .store
        .catalog_update(&record)
        .api_err("Failed to update record")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(record)))
}

pub async fn delete<R: CatalogResource>(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .catalog_delete::<R>(&id)
        .api_err("Failed to delete record")?;

    if !deleted {
        return Err(ApiError::not_found(R::NOT_FOUND));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

fn positive_capacity(capacity: i64) -> Result<(), String> {
    if capacity <= 0 {
        return Err("capacity must be positive".to_string());
    }
    Ok(())
}

impl CatalogResource for Classroom {
    type Create = CreateClassroomRequest;
    type Update = UpdateClassroomRequest;

    const NOT_FOUND: &'static str = "Classroom not found";

    fn build(req: Self::Create) -> Result<Self, String> {
        require_nonempty(&req.name, "name")?;
        require_nonempty(&req.building, "building")?;
        positive_capacity(req.capacity)?;

        let now = Utc::now();
        Ok(Classroom {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            building: req.building,
            capacity: req.capacity,
            facilities: req.facilities,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, req: Self::Update) -> Result<(), String> {
        if let Some(name) = req.name {
            require_nonempty(&name, "name")?;
            self.name = name;
        }
        if let Some(building) = req.building {
            require_nonempty(&building, "building")?;
            self.building = building;
        }
        if let Some(capacity) = req.capacity {
            positive_capacity(capacity)?;
            self.capacity = capacity;
        }
        if let Some(facilities) = req.facilities {
            self.facilities = Some(facilities);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl CatalogResource for Lab {
    type Create = CreateLabRequest;
    type Update = UpdateLabRequest;

    const NOT_FOUND: &'static str = "Lab not found";

    fn build(req: Self::Create) -> Result<Self, String> {
        require_nonempty(&req.name, "name")?;
        require_nonempty(&req.building, "building")?;
        positive_capacity(req.capacity)?;

        let now = Utc::now();
        Ok(Lab {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            building: req.building,
            capacity: req.capacity,
            equipment: req.equipment,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, req: Self::Update) -> Result<(), String> {
        if let Some(name) = req.name {
            require_nonempty(&name, "name")?;
            self.name = name;
        }
        if let Some(building) = req.building {
            require_nonempty(&building, "building")?;
            self.building = building;
        }
        if let Some(capacity) = req.capacity {
            positive_capacity(capacity)?;
            self.capacity = capacity;
        }
        if let Some(equipment) = req.equipment {
            self.equipment = Some(equipment);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl CatalogResource for CafeteriaMenuItem {
    type Create = CreateMenuItemRequest;
    type Update = UpdateMenuItemRequest;

    const NOT_FOUND: &'static str = "Menu item not found";

    fn build(req: Self::Create) -> Result<Self, String> {
        require_nonempty(&req.dish, "dish")?;

        let now = Utc::now();
        Ok(CafeteriaMenuItem {
            id: Uuid::new_v4().to_string(),
            day_of_week: req.day_of_week,
            meal: req.meal,
            dish: req.dish,
            price_cents: req.price_cents,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, req: Self::Update) -> Result<(), String> {
        if let Some(day) = req.day_of_week {
            self.day_of_week = day;
        }
        if let Some(meal) = req.meal {
            self.meal = meal;
        }
        if let Some(dish) = req.dish {
            require_nonempty(&dish, "dish")?;
            self.dish = dish;
        }
        if let Some(price_cents) = req.price_cents {
            self.price_cents = Some(price_cents);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl CatalogResource for CafeteriaInfo {
    type Create = CreateCafeteriaInfoRequest;
    type Update = UpdateCafeteriaInfoRequest;

    const NOT_FOUND: &'static str = "Cafeteria info not found";

    fn build(req: Self::Create) -> Result<Self, String> {
        require_nonempty(&req.name, "name")?;
        require_nonempty(&req.location, "location")?;
        require_nonempty(&req.opening_hours, "opening_hours")?;

        let now = Utc::now();
        Ok(CafeteriaInfo {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            location: req.location,
            opening_hours: req.opening_hours,
            contact: req.contact,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, req: Self::Update) -> Result<(), String> {
        if let Some(name) = req.name {
            require_nonempty(&name, "name")?;
            self.name = name;
        }
        if let Some(location) = req.location {
            require_nonempty(&location, "location")?;
            self.location = location;
        }
        if let Some(opening_hours) = req.opening_hours {
            require_nonempty(&opening_hours, "opening_hours")?;
            self.opening_hours = opening_hours;
        }
        if let Some(contact) = req.contact {
            self.contact = Some(contact);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
