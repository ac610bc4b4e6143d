use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Datelike, Utc};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::auth::check_auth;
use crate::models::{ApiResponse, Service, Vehicle, VehicleForm, VehicleUpdate};
use crate::state::AppState;

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Service>>>, AppError> {
    let services = {
        let db = state.db.lock().unwrap();
        queries::list_services(&db)?
    };
    Ok(Json(ApiResponse::ok(services)))
}

// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Service>>, AppError> {
    let service = {
        let db = state.db.lock().unwrap();
        queries::get_service(&db, &id)?
    };
    service
        .map(|s| Json(ApiResponse::ok(s)))
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
}

fn validate_vehicle(vehicle: &Vehicle) -> Result<(), AppError> {
    if vehicle.make.trim().is_empty() || vehicle.model.trim().is_empty() {
        return Err(AppError::Validation("Make and model are required".to_string()));
    }
    let max_year = Utc::now().year() + 1;
    if vehicle.year < 1900 || vehicle.year > max_year {
        return Err(AppError::Validation(format!(
            "Year must be between 1900 and {max_year}"
        )));
    }
    Ok(())
}

// GET /api/vehicles
pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let vehicles = {
        let db = state.db.lock().unwrap();
        queries::list_vehicles_for_customer(&db, &user_id)?
    };
    Ok(Json(ApiResponse::ok(vehicles)))
}

/// Looks up a vehicle the caller owns. Someone else's vehicle reads as
/// missing.
fn owned_vehicle(state: &AppState, id: &str, user_id: &str) -> Result<Vehicle, AppError> {
    let vehicle = {
        let db = state.db.lock().unwrap();
        queries::get_vehicle(&db, id)?
    };
    vehicle
        .filter(|v| v.customer_id == user_id)
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
}

// GET /api/vehicles/:id
pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let vehicle = owned_vehicle(&state, &id, &user_id)?;
    Ok(Json(ApiResponse::ok(vehicle)))
}

// POST /api/vehicles
pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<VehicleForm>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let user_id = check_auth(&state, &headers)?;

    let now = Utc::now();
    let vehicle = Vehicle {
        id: uuid::Uuid::new_v4().to_string(),
        customer_id: user_id,
        make: form.make.trim().to_string(),
        model: form.model.trim().to_string(),
        year: form.year,
        vin: form.vin.trim().to_uppercase(),
        license_plate: form.license_plate.trim().to_string(),
        color: form.color.trim().to_string(),
        mileage: form.mileage,
        created_at: now,
        updated_at: now,
    };
    validate_vehicle(&vehicle)?;

    {
        let db = state.db.lock().unwrap();
        queries::create_vehicle(&db, &vehicle)?;
    }

    tracing::info!(vehicle_id = %vehicle.id, "vehicle registered");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(vehicle))))
}

// PUT /api/vehicles/:id
pub async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<VehicleUpdate>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let mut vehicle = owned_vehicle(&state, &id, &user_id)?;
    update.apply(&mut vehicle);
    validate_vehicle(&vehicle)?;
    vehicle.updated_at = Utc::now();

    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_vehicle(&db, &vehicle)?
    };
    if !updated {
        return Err(AppError::NotFound("Vehicle not found".to_string()));
    }
    Ok(Json(ApiResponse::ok(vehicle)))
}

// DELETE /api/vehicles/:id
pub async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_vehicle(&db, &id, &user_id)?
    };

    if deleted {
        tracing::info!(vehicle_id = %id, "vehicle removed");
        let mut resp = ApiResponse::ok(serde_json::Value::Null);
        resp.message = Some("Vehicle deleted".to_string());
        Ok(Json(resp))
    } else {
        Err(AppError::NotFound("Vehicle not found".to_string()))
    }
}
