use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{RecordStore, Repository};
use shared_models::{TimeSlot, TimeSlotFilter};
use shared_utils::{parse_timestamp, require};

use crate::models::{CreateTimeSlotRequest, TimeSlotError};

/// Registry of bookable windows. Availability is only ever flipped by the
/// appointment engine, so nothing here writes `available` after creation.
pub struct TimeSlotService {
    store: RecordStore,
}

impl TimeSlotService {
    pub fn new(store: &RecordStore) -> Self {
        Self { store: store.clone() }
    }

    pub async fn create_slot(&self, request: CreateTimeSlotRequest) -> Result<TimeSlot, TimeSlotError> {
        let doctor_id = require("doctor_id", request.doctor_id)?;
        let start_time = parse_timestamp(&require("start_time", request.start_time)?)?;
        let end_time = parse_timestamp(&require("end_time", request.end_time)?)?;

        if end_time <= start_time {
            warn!("Rejected slot for doctor {}: {} is not after {}", doctor_id, end_time, start_time);
            return Err(TimeSlotError::EmptyWindow);
        }

        if self.store.doctors.get(doctor_id).await?.is_none() {
            return Err(TimeSlotError::UnknownDoctor(doctor_id));
        }

        let slot = TimeSlot {
            id: Uuid::new_v4(),
            doctor_id,
            start_time,
            end_time,
            available: true,
            created_at: Utc::now(),
        };

        let slot = self.store.time_slots.insert(slot).await?;
        info!(
            "Time slot {} created for doctor {} ({} minutes)",
            slot.id,
            doctor_id,
            slot.duration_minutes()
        );
        Ok(slot)
    }

    pub async fn list_all(&self) -> Result<Vec<TimeSlot>, TimeSlotError> {
        Ok(self.store.time_slots.list(&TimeSlotFilter::default()).await?)
    }

    pub async fn list_available_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<TimeSlot>, TimeSlotError> {
        debug!("Listing available slots for doctor {}", doctor_id);
        Ok(self
            .store
            .time_slots
            .list(&TimeSlotFilter::available_for_doctor(doctor_id))
            .await?)
    }

    /// Available slots starting strictly after `after`.
    pub async fn list_available_after(&self, after: DateTime<Utc>) -> Result<Vec<TimeSlot>, TimeSlotError> {
        debug!("Listing available slots after {}", after);
        Ok(self
            .store
            .time_slots
            .list(&TimeSlotFilter::available_after(after))
            .await?)
    }
}
