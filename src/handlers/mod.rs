pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

/// The booking API, mounted under `/api`.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/services", get(catalog::list_services))
        .route("/services/:id", get(catalog::get_service))
        .route(
            "/vehicles",
            get(catalog::list_vehicles).post(catalog::create_vehicle),
        )
        .route(
            "/vehicles/:id",
            get(catalog::get_vehicle)
                .put(catalog::update_vehicle)
                .delete(catalog::delete_vehicle),
        )
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/bookings/available-slots", get(bookings::available_slots))
        .route(
            "/bookings/:id",
            get(bookings::get_booking).put(bookings::update_booking),
        )
        .route("/bookings/:id/cancel", patch(bookings::cancel_booking))
        .route("/dashboard/stats", get(bookings::dashboard_stats));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .with_state(state)
}
