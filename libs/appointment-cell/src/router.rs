use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use shared_database::AppState;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments).post(handlers::book_appointment))
        .route("/status/{status}", get(handlers::list_by_status))
        .route("/upcoming", get(handlers::list_upcoming))
        .route("/history", get(handlers::list_history))
        .route("/patient/{patient_id}", get(handlers::list_by_patient))
        .route("/doctor/{doctor_id}", get(handlers::list_by_doctor))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/approve", put(handlers::approve_appointment))
        .route("/{appointment_id}/reject", put(handlers::reject_appointment))
        .route("/{appointment_id}/cancel", put(handlers::cancel_appointment))
        .route("/{appointment_id}/reschedule", put(handlers::reschedule_appointment))
        .with_state(state)
}
