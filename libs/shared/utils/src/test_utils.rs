use std::sync::Arc;

use axum::{body::Body, response::Response};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{AppState, RecordStore, Repository};
use shared_models::{Appointment, AppointmentStatus, Doctor, TimeSlot};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { supabase_url: url.into(), ..Self::default() }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig::supabase(self.supabase_url.clone(), self.supabase_service_key.clone())
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub fn memory_state() -> Arc<AppState> {
    Arc::new(AppState::in_memory())
}

/// A fixed future day so fixtures never drift into the past.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 15, hour, minute, 0)
        .single()
        .expect("valid fixture time")
}

pub fn window(hour: u32, minute: u32, minutes: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at(hour, minute);
    (start, start + Duration::minutes(minutes))
}

pub struct Fixtures;

impl Fixtures {
    pub fn doctor(name: &str, specialty: &str) -> Doctor {
        let now = Utc::now();
        Doctor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            specialty: specialty.to_string(),
            description: Some(format!("{} specialist", specialty)),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slot(doctor_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> TimeSlot {
        TimeSlot {
            id: Uuid::new_v4(),
            doctor_id,
            start_time: start,
            end_time: end,
            available: true,
            created_at: Utc::now(),
        }
    }

    pub fn appointment(slot: &TimeSlot, patient_id: Uuid, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: slot.doctor_id,
            patient_id,
            time_slot_id: slot.id,
            appointment_time: slot.start_time,
            note: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }
}

pub async fn seed_doctor(store: &RecordStore, name: &str, specialty: &str) -> Doctor {
    store
        .doctors
        .insert(Fixtures::doctor(name, specialty))
        .await
        .expect("seed doctor")
}

pub async fn seed_slot(store: &RecordStore, doctor_id: Uuid, hour: u32, minute: u32) -> TimeSlot {
    let (start, end) = window(hour, minute, 30);
    store
        .time_slots
        .insert(Fixtures::slot(doctor_id, start, end))
        .await
        .expect("seed time slot")
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");

    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
