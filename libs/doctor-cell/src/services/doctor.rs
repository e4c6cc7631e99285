use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{RecordStore, StoreError};
use shared_models::{Doctor, DoctorFilter};
use shared_utils::require_text;

use crate::models::{CreateDoctorRequest, DoctorError, UpdateDoctorRequest};

pub struct DoctorService {
    store: RecordStore,
}

impl DoctorService {
    pub fn new(store: &RecordStore) -> Self {
        Self { store: store.clone() }
    }

    /// Create a new doctor profile
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        let name = require_text("name", request.name)?;
        let specialty = require_text("specialty", request.specialty)?;
        let now = Utc::now();

        let doctor = Doctor {
            id: Uuid::new_v4(),
            name,
            specialty,
            description: request.description,
            enabled: request.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let doctor = self.store.doctors.insert(doctor).await?;
        info!("Doctor profile created with ID: {}", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        self.store
            .doctors
            .get(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    pub async fn list_enabled(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.store.doctors.list(&DoctorFilter::enabled()).await?)
    }

    /// Exact, case-sensitive specialty match among enabled doctors.
    pub async fn list_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing enabled doctors with specialty {}", specialty);
        Ok(self
            .store
            .doctors
            .list(&DoctorFilter::enabled_with_specialty(specialty))
            .await?)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        let name = require_text("name", request.name)?;
        let specialty = require_text("specialty", request.specialty)?;
        let existing = self.get_doctor(doctor_id).await?;

        let doctor = Doctor {
            name,
            specialty,
            description: request.description,
            enabled: request.enabled.unwrap_or(true),
            updated_at: Utc::now(),
            ..existing
        };

        let doctor = self.store.doctors.update(doctor).await.map_err(|e| not_found(e, doctor_id))?;
        info!("Doctor profile {} updated", doctor_id);
        Ok(doctor)
    }

    pub async fn disable_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let existing = self.get_doctor(doctor_id).await?;

        let doctor = Doctor { enabled: false, updated_at: Utc::now(), ..existing };
        let doctor = self.store.doctors.update(doctor).await.map_err(|e| not_found(e, doctor_id))?;

        info!("Doctor {} disabled", doctor_id);
        Ok(doctor)
    }

    /// Hard delete. Existing slots and appointments keep their reference.
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        self.store
            .doctors
            .delete(doctor_id)
            .await
            .map_err(|e| not_found(e, doctor_id))?;

        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }
}

fn not_found(err: StoreError, doctor_id: Uuid) -> DoctorError {
    match err {
        StoreError::NotFound { .. } => DoctorError::NotFound(doctor_id),
        other => DoctorError::Store(other),
    }
}
