use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::AppointmentStatus;
use shared_utils::ValidationError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookAppointmentRequest {
    #[serde(alias = "patientId")]
    pub patient_id: Option<Uuid>,
    #[serde(alias = "timeSlotId")]
    pub time_slot_id: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RescheduleQuery {
    #[serde(rename = "newTimeSlotId", alias = "new_time_slot_id")]
    pub new_time_slot_id: Option<Uuid>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Appointment {0} not found")]
    AppointmentNotFound(Uuid),

    #[error("Time slot {0} not found")]
    SlotNotFound(Uuid),

    #[error("Time slot {0} is already booked")]
    SlotNotAvailable(Uuid),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    /// The old appointment was cancelled but booking the new slot failed.
    /// The old appointment stays cancelled.
    #[error("Appointment {cancelled_appointment_id} was cancelled but rebooking failed: {reason}")]
    RescheduleIncomplete {
        cancelled_appointment_id: Uuid,
        reason: Box<AppointmentError>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for AppointmentError {
    fn from(err: ValidationError) -> Self {
        AppointmentError::InvalidArgument(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();

        match err {
            AppointmentError::InvalidArgument(_) => AppError::ValidationError(message),
            AppointmentError::AppointmentNotFound(_) | AppointmentError::SlotNotFound(_) => {
                AppError::NotFound(message)
            }
            AppointmentError::SlotNotAvailable(_) => AppError::Conflict(message),
            AppointmentError::InvalidStatusTransition { .. } => AppError::InvalidTransition(message),
            // Same status as the underlying failure, with the partial outcome in the message.
            AppointmentError::RescheduleIncomplete { reason, .. } => {
                relabel(AppError::from(*reason), message)
            }
            AppointmentError::Store(StoreError::NotFound { .. }) => AppError::NotFound(message),
            AppointmentError::Store(StoreError::Conflict(_)) => AppError::Conflict(message),
            AppointmentError::Store(_) => AppError::Database(message),
        }
    }
}

fn relabel(err: AppError, message: String) -> AppError {
    match err {
        AppError::Auth(_) => AppError::Auth(message),
        AppError::NotFound(_) => AppError::NotFound(message),
        AppError::Internal(_) => AppError::Internal(message),
        AppError::Database(_) => AppError::Database(message),
        AppError::ValidationError(_) => AppError::ValidationError(message),
        AppError::Conflict(_) => AppError::Conflict(message),
        AppError::InvalidTransition(_) => AppError::InvalidTransition(message),
    }
}
