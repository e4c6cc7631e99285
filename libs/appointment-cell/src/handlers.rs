use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::{Appointment, AppointmentStatus};
use shared_utils::JsonBody;

use crate::models::{AppointmentError, BookAppointmentRequest, RescheduleQuery};
use crate::services::AppointmentBookingService;

type AppointmentList = Result<Json<Vec<Appointment>>, AppError>;

// ==============================================================================
// BOOKING AND STATUS CHANGES
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = AppointmentBookingService::new(&state.store)
        .book_appointment(request)
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn approve_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.approve_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn reject_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.reject_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.cancel_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Query(query): Query<RescheduleQuery>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentBookingService::new(&state.store);
    let appointment = service
        .reschedule_appointment(appointment_id, query.new_time_slot_id)
        .await?;

    Ok(Json(appointment))
}

// ==============================================================================
// LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.get_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn list_appointments(State(state): State<Arc<AppState>>) -> AppointmentList {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.list_all().await?))
}

#[axum::debug_handler]
pub async fn list_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> AppointmentList {
    let status: AppointmentStatus = status.parse().map_err(AppointmentError::InvalidArgument)?;

    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.list_by_status(status).await?))
}

#[axum::debug_handler]
pub async fn list_upcoming(State(state): State<Arc<AppState>>) -> AppointmentList {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.list_upcoming().await?))
}

#[axum::debug_handler]
pub async fn list_history(State(state): State<Arc<AppState>>) -> AppointmentList {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.list_history().await?))
}

#[axum::debug_handler]
pub async fn list_by_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
) -> AppointmentList {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.list_by_patient(patient_id).await?))
}

#[axum::debug_handler]
pub async fn list_by_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> AppointmentList {
    let service = AppointmentBookingService::new(&state.store);
    Ok(Json(service.list_by_doctor(doctor_id).await?))
}
