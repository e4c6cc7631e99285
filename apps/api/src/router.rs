use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::user_routes;
use doctor_cell::router::{doctor_routes, timeslot_routes};
use shared_database::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/users", user_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/timeslots", timeslot_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
}
