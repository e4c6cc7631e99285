use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_database::{AppointmentStore, RecordStore, Repository, StoreError, TimeSlotStore};
use shared_models::{Appointment, AppointmentFilter, AppointmentStatus};
use shared_utils::require;

use crate::models::{AppointmentError, BookAppointmentRequest};
use crate::services::lifecycle::AppointmentLifecycleService;

/// Appointment lifecycle engine.
///
/// Every booking flips exactly one slot to unavailable and every cancel flips
/// it back, so a slot is available iff no PENDING or APPROVED appointment
/// references it. Two-record writes are kept consistent by compensation:
/// the first write is undone when the second one fails.
pub struct AppointmentBookingService {
    store: RecordStore,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            lifecycle_service: AppointmentLifecycleService::new(),
        }
    }

    // ==========================================================================
    // WRITES
    // ==========================================================================

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let patient_id = require("patient_id", request.patient_id)?;
        let time_slot_id = require("time_slot_id", request.time_slot_id)?;

        self.book_slot(patient_id, time_slot_id, request.note).await
    }

    pub async fn approve_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self.transition(appointment_id, AppointmentStatus::Approved).await?;
        info!("Appointment {} approved", appointment_id);
        Ok(appointment)
    }

    /// The slot stays occupied after a rejection.
    pub async fn reject_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self.transition(appointment_id, AppointmentStatus::Rejected).await?;
        info!("Appointment {} rejected", appointment_id);
        Ok(appointment)
    }

    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service
            .validate_status_transition(current.status, AppointmentStatus::Cancelled)?;

        // Nothing is written when the slot is already gone.
        let slot_id = current.time_slot_id;
        if self.store.time_slots.get(slot_id).await?.is_none() {
            warn!("Appointment {} references missing time slot {}", appointment_id, slot_id);
            return Err(AppointmentError::SlotNotFound(slot_id));
        }

        let cancelled = self.apply_transition(&current, AppointmentStatus::Cancelled).await?;

        if let Err(e) = self.store.time_slots.release(slot_id).await {
            error!("Failed to release time slot {} for appointment {}: {}", slot_id, appointment_id, e);
            self.restore_status(appointment_id, current.status).await;
            return Err(slot_error(e, slot_id));
        }

        info!("Appointment {} cancelled, time slot {} released", appointment_id, slot_id);
        Ok(cancelled)
    }

    /// Cancel, then book the new slot for the same patient. The result is a
    /// new appointment; the old one is left CANCELLED. When the second step
    /// fails the old appointment is not restored.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        new_time_slot_id: Option<Uuid>,
    ) -> Result<Appointment, AppointmentError> {
        let new_time_slot_id = require("newTimeSlotId", new_time_slot_id)?;
        debug!("Rescheduling appointment {} to slot {}", appointment_id, new_time_slot_id);

        let current = self.get_appointment(appointment_id).await?;
        if !current.status.is_active() {
            warn!("Reschedule rejected, appointment {} is {}", appointment_id, current.status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current.status,
                to: AppointmentStatus::Cancelled,
            });
        }

        let cancelled = self.cancel_appointment(appointment_id).await?;

        match self
            .book_slot(cancelled.patient_id, new_time_slot_id, cancelled.note.clone())
            .await
        {
            Ok(rebooked) => {
                info!("Appointment {} rescheduled as {}", appointment_id, rebooked.id);
                Ok(rebooked)
            }
            Err(reason) => {
                warn!(
                    "Reschedule of appointment {} left it cancelled: {}",
                    appointment_id, reason
                );
                Err(AppointmentError::RescheduleIncomplete {
                    cancelled_appointment_id: appointment_id,
                    reason: Box::new(reason),
                })
            }
        }
    }

    // ==========================================================================
    // READS
    // ==========================================================================

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        self.store
            .appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::AppointmentNotFound(appointment_id))
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(AppointmentFilter::default()).await
    }

    pub async fn list_by_status(&self, status: AppointmentStatus) -> Result<Vec<Appointment>, AppointmentError> {
        self.list_by_statuses(&[status]).await
    }

    pub async fn list_by_statuses(
        &self,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(AppointmentFilter::with_statuses(statuses)).await
    }

    pub async fn list_upcoming(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.list_by_statuses(&AppointmentStatus::UPCOMING).await
    }

    pub async fn list_history(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.list_by_statuses(&AppointmentStatus::HISTORY).await
    }

    pub async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(AppointmentFilter::for_patient(patient_id)).await
    }

    pub async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(AppointmentFilter::for_doctor(doctor_id)).await
    }

    // ==========================================================================
    // INTERNALS
    // ==========================================================================

    async fn list(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments with {:?}", filter);
        Ok(self.store.appointments.list(&filter).await?)
    }

    async fn book_slot(
        &self,
        patient_id: Uuid,
        time_slot_id: Uuid,
        note: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking time slot {} for patient {}", time_slot_id, patient_id);

        let slot = self
            .store
            .time_slots
            .get(time_slot_id)
            .await?
            .ok_or(AppointmentError::SlotNotFound(time_slot_id))?;

        if !slot.available {
            warn!("Time slot {} is already booked", time_slot_id);
            return Err(AppointmentError::SlotNotAvailable(time_slot_id));
        }

        // The availability check above is advisory; the swap decides races.
        let slot = self
            .store
            .time_slots
            .occupy(time_slot_id)
            .await
            .map_err(|e| slot_error(e, time_slot_id))?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: slot.doctor_id,
            patient_id,
            time_slot_id,
            appointment_time: slot.start_time,
            note,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        match self.store.appointments.insert(appointment).await {
            Ok(appointment) => {
                info!(
                    "Appointment {} booked with doctor {} at {}",
                    appointment.id, appointment.doctor_id, appointment.appointment_time
                );
                Ok(appointment)
            }
            Err(e) => {
                error!("Failed to record appointment for time slot {}: {}", time_slot_id, e);
                if let Err(release_err) = self.store.time_slots.release(time_slot_id).await {
                    error!(
                        "Failed to release time slot {} after aborted booking: {}",
                        time_slot_id, release_err
                    );
                }
                Err(e.into())
            }
        }
    }

    async fn transition(
        &self,
        appointment_id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service.validate_status_transition(current.status, next)?;
        self.apply_transition(&current, next).await
    }

    /// Status compare-and-set against the status that was validated. A lost
    /// race is reported against whatever status won.
    async fn apply_transition(
        &self,
        current: &Appointment,
        next: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        match self
            .store
            .appointments
            .transition_status(current.id, current.status, next)
            .await
        {
            Ok(appointment) => Ok(appointment),
            Err(StoreError::Conflict(_)) => {
                let latest = self.get_appointment(current.id).await?;
                warn!(
                    "Appointment {} changed to {} before {} could be applied",
                    current.id, latest.status, next
                );
                Err(AppointmentError::InvalidStatusTransition { from: latest.status, to: next })
            }
            Err(StoreError::NotFound { .. }) => Err(AppointmentError::AppointmentNotFound(current.id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn restore_status(&self, appointment_id: Uuid, previous: AppointmentStatus) {
        match self
            .store
            .appointments
            .transition_status(appointment_id, AppointmentStatus::Cancelled, previous)
            .await
        {
            Ok(_) => warn!("Appointment {} restored to {}", appointment_id, previous),
            Err(e) => error!(
                "Failed to restore appointment {} to {}: {}",
                appointment_id, previous, e
            ),
        }
    }
}

fn slot_error(err: StoreError, time_slot_id: Uuid) -> AppointmentError {
    match err {
        StoreError::NotFound { .. } => AppointmentError::SlotNotFound(time_slot_id),
        StoreError::Conflict(_) => AppointmentError::SlotNotAvailable(time_slot_id),
        other => AppointmentError::Store(other),
    }
}
