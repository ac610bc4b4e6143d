use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::auth::check_auth;
use crate::models::{
    ApiResponse, AvailableSlots, Booking, BookingRequest, BookingStatus, BookingUpdate,
    DashboardStats, Service, Vehicle,
};
use crate::services::dashboard;
use crate::services::scheduling::{self, SchedulingError};
use crate::state::AppState;

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings_for_customer(&db, &user_id)?
    };
    Ok(Json(ApiResponse::ok(bookings)))
}

fn owned_booking(state: &AppState, id: &str, user_id: &str) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking(&db, id)?
    };
    booking
        .filter(|b| b.customer_id == user_id)
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let booking = owned_booking(&state, &id, &user_id)?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// The active service and the customer's own vehicle a request refers to.
fn booking_terms(
    db: &Connection,
    req: &BookingRequest,
    user_id: &str,
) -> Result<(Service, Vehicle), AppError> {
    let service = queries::get_service(db, &req.service_id)?.filter(|s| s.is_active);
    let vehicle = queries::get_vehicle(db, &req.vehicle_id)?.filter(|v| v.customer_id == user_id);
    match (service, vehicle) {
        (Some(s), Some(v)) => Ok((s, v)),
        _ => Err(AppError::NotFound("Service or vehicle not found".to_string())),
    }
}

fn slot_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::Conflict => AppError::Conflict(e.to_string()),
        other => AppError::Validation(other.to_string()),
    }
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let user_id = check_auth(&state, &headers)?;
    let date = req
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = {
        let db = state.db.lock().unwrap();
        let (service, vehicle) = booking_terms(&db, &req, &user_id)?;

        // Checked and inserted under the same lock so two requests cannot
        // both take the slot.
        let existing = queries::get_active_bookings_on_date(&db, date)?;
        let now = Local::now().naive_local();
        scheduling::check_slot(date, &req.appointment_time, service.duration, &existing, now)
            .map_err(slot_error)?;

        let booking = Booking::pending(&user_id, &req, date, &service, &vehicle);
        queries::create_booking(&db, &booking)?;
        booking
    };

    tracing::info!(
        booking_id = %booking.id,
        date = %booking.appointment_date,
        time = %booking.appointment_time,
        "booking created"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(booking))))
}

// PUT /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<BookingUpdate>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let mut booking = owned_booking(&state, &id, &user_id)?;

    if !booking.is_upcoming() {
        return Err(AppError::Validation(format!(
            "A {} booking cannot be changed",
            booking.status.as_str()
        )));
    }

    let mut req = BookingRequest::from_booking(&booking);
    update.apply(&mut req);
    let date = req
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    {
        let db = state.db.lock().unwrap();
        let (service, vehicle) = booking_terms(&db, &req, &user_id)?;

        // Notes or vehicle alone keep the slot the booking already holds.
        if update.moves_slot() {
            let existing: Vec<Booking> = queries::get_active_bookings_on_date(&db, date)?
                .into_iter()
                .filter(|b| b.id != id)
                .collect();
            let now = Local::now().naive_local();
            scheduling::check_slot(date, &req.appointment_time, service.duration, &existing, now)
                .map_err(slot_error)?;
        }

        booking.reschedule(&req, date, &service, &vehicle);
        queries::update_booking(&db, &booking)?;
    }

    tracing::info!(
        booking_id = %id,
        date = %booking.appointment_date,
        time = %booking.appointment_time,
        "booking updated"
    );
    Ok(Json(ApiResponse::ok(booking)))
}

// PATCH /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let booking = owned_booking(&state, &id, &user_id)?;

    if !booking.is_upcoming() {
        return Err(AppError::Validation(format!(
            "A {} booking cannot be cancelled",
            booking.status.as_str()
        )));
    }

    let cancelled = {
        let db = state.db.lock().unwrap();
        queries::update_booking_status(&db, &id, &BookingStatus::Cancelled)?;
        queries::get_booking(&db, &id)?
    };

    tracing::info!(booking_id = %id, "booking cancelled");
    cancelled
        .map(|b| Json(ApiResponse::ok(b)))
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

// GET /api/bookings/available-slots?date=&serviceId=
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsQuery {
    pub date: String,
    pub service_id: String,
}

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<ApiResponse<AvailableSlots>>, AppError> {
    check_auth(&state, &headers)?;
    let date = NaiveDate::parse_from_str(query.date.trim(), BookingRequest::DATE_FORMAT)
        .map_err(|_| AppError::Validation("Please select a valid date".to_string()))?;

    let (service, existing) = {
        let db = state.db.lock().unwrap();
        let service = queries::get_service(&db, &query.service_id)?
            .filter(|s| s.is_active)
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        (service, queries::get_active_bookings_on_date(&db, date)?)
    };

    let slots = scheduling::compute_slots(date, service.duration, &existing, Local::now().naive_local());
    Ok(Json(ApiResponse::ok(AvailableSlots { date, slots })))
}

// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings_for_customer(&db, &user_id)?
    };
    let stats = dashboard::compute_stats(&bookings, Local::now().date_naive());
    Ok(Json(ApiResponse::ok(stats)))
}
