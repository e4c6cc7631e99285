use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_doctor).get(handlers::list_doctors))
        .route("/specialty/{specialty}", get(handlers::list_doctors_by_specialty))
        .route(
            "/{doctor_id}",
            get(handlers::get_doctor)
                .put(handlers::update_doctor)
                .delete(handlers::delete_doctor),
        )
        .route("/{doctor_id}/disable", put(handlers::disable_doctor))
        .with_state(state)
}

pub fn timeslot_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_time_slot).get(handlers::list_time_slots))
        .route("/available", get(handlers::list_available_after))
        .route("/doctor/{doctor_id}/available", get(handlers::list_available_for_doctor))
        .with_state(state)
}
