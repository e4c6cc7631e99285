use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_utils::ValidationError;

// ==============================================================================
// DOCTOR REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    /// Defaults to true.
    pub enabled: Option<bool>,
}

/// Full overwrite of the editable fields. Omitted `description` clears it,
/// omitted `enabled` means enabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

// ==============================================================================
// TIME SLOT REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTimeSlotRequest {
    #[serde(alias = "doctorId")]
    pub doctor_id: Option<Uuid>,
    #[serde(alias = "startTime")]
    pub start_time: Option<String>,
    #[serde(alias = "endTime")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableAfterQuery {
    pub after: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Doctor {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum TimeSlotError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Time slot must end after it starts")]
    EmptyWindow,

    #[error("Doctor {0} does not exist")]
    UnknownDoctor(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for DoctorError {
    fn from(err: ValidationError) -> Self {
        DoctorError::InvalidArgument(err.to_string())
    }
}

impl From<ValidationError> for TimeSlotError {
    fn from(err: ValidationError) -> Self {
        TimeSlotError::InvalidArgument(err.to_string())
    }
}

fn store_to_app_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
        StoreError::Conflict(msg) => AppError::Conflict(msg),
        other => AppError::Database(other.to_string()),
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::InvalidArgument(msg) => AppError::ValidationError(msg),
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::Store(e) => store_to_app_error(e),
        }
    }
}

impl From<TimeSlotError> for AppError {
    fn from(err: TimeSlotError) -> Self {
        match err {
            TimeSlotError::InvalidArgument(msg) => AppError::ValidationError(msg),
            TimeSlotError::EmptyWindow | TimeSlotError::UnknownDoctor(_) => {
                AppError::ValidationError(err.to_string())
            }
            TimeSlotError::Store(e) => store_to_app_error(e),
        }
    }
}
