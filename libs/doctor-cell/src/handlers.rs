use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::{Doctor, TimeSlot};
use shared_utils::{parse_timestamp, require, JsonBody};

use crate::models::{
    AvailableAfterQuery, CreateDoctorRequest, CreateTimeSlotRequest, TimeSlotError,
    UpdateDoctorRequest,
};
use crate::services::{DoctorService, TimeSlotService};

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    let doctor = DoctorService::new(&state.store).create_doctor(request).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctors = DoctorService::new(&state.store).list_enabled().await?;
    Ok(Json(doctors))
}

#[axum::debug_handler]
pub async fn list_doctors_by_specialty(
    State(state): State<Arc<AppState>>,
    Path(specialty): Path<String>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctors = DoctorService::new(&state.store).list_by_specialty(&specialty).await?;
    Ok(Json(doctors))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = DoctorService::new(&state.store).get_doctor(doctor_id).await?;
    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateDoctorRequest>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = DoctorService::new(&state.store).update_doctor(doctor_id, request).await?;
    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn disable_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = DoctorService::new(&state.store).disable_doctor(doctor_id).await?;
    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    DoctorService::new(&state.store).delete_doctor(doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Doctor deleted",
        "doctor_id": doctor_id
    })))
}

// ==============================================================================
// TIME SLOT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_time_slot(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateTimeSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlot>), AppError> {
    let slot = TimeSlotService::new(&state.store).create_slot(request).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[axum::debug_handler]
pub async fn list_time_slots(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let slots = TimeSlotService::new(&state.store).list_all().await?;
    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn list_available_for_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let slots = TimeSlotService::new(&state.store)
        .list_available_by_doctor(doctor_id)
        .await?;
    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn list_available_after(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableAfterQuery>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let after = require("after", query.after)
        .and_then(|raw| parse_timestamp(&raw))
        .map_err(TimeSlotError::from)?;

    let slots = TimeSlotService::new(&state.store).list_available_after(after).await?;
    Ok(Json(slots))
}
