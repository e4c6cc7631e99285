use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{Record, RecordFilter};

// ==============================================================================
// DOCTOR
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    pub enabled: Option<bool>,
    pub specialty: Option<String>,
}

impl DoctorFilter {
    pub fn enabled() -> Self {
        Self { enabled: Some(true), specialty: None }
    }

    pub fn enabled_with_specialty(specialty: impl Into<String>) -> Self {
        Self { enabled: Some(true), specialty: Some(specialty.into()) }
    }
}

impl RecordFilter<Doctor> for DoctorFilter {
    fn matches(&self, record: &Doctor) -> bool {
        self.enabled.map_or(true, |e| record.enabled == e)
            && self.specialty.as_deref().map_or(true, |s| record.specialty == s)
    }
}

impl Record for Doctor {
    type Filter = DoctorFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }
}

// ==============================================================================
// TIME SLOT
// ==============================================================================

/// A bookable window owned by one doctor. `end_time > start_time` always holds
/// for slots created through the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeSlotFilter {
    pub doctor_id: Option<Uuid>,
    pub available: Option<bool>,
    /// Strictly after this instant.
    pub starts_after: Option<DateTime<Utc>>,
}

impl TimeSlotFilter {
    pub fn available_for_doctor(doctor_id: Uuid) -> Self {
        Self { doctor_id: Some(doctor_id), available: Some(true), starts_after: None }
    }

    pub fn available_after(after: DateTime<Utc>) -> Self {
        Self { doctor_id: None, available: Some(true), starts_after: Some(after) }
    }
}

impl RecordFilter<TimeSlot> for TimeSlotFilter {
    fn matches(&self, record: &TimeSlot) -> bool {
        self.doctor_id.map_or(true, |d| record.doctor_id == d)
            && self.available.map_or(true, |a| record.available == a)
            && self.starts_after.map_or(true, |t| record.start_time > t)
    }
}

impl Record for TimeSlot {
    type Filter = TimeSlotFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.start_time, self.id)
    }
}

// ==============================================================================
// APPOINTMENT
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl AppointmentStatus {
    pub const UPCOMING: [AppointmentStatus; 2] =
        [AppointmentStatus::Pending, AppointmentStatus::Approved];
    pub const HISTORY: [AppointmentStatus; 2] =
        [AppointmentStatus::Cancelled, AppointmentStatus::Rejected];

    /// Statuses that hold a claim on the referenced slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Approved)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "PENDING"),
            AppointmentStatus::Approved => write!(f, "APPROVED"),
            AppointmentStatus::Rejected => write!(f, "REJECTED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(AppointmentStatus::Pending),
            "APPROVED" => Ok(AppointmentStatus::Approved),
            "REJECTED" => Ok(AppointmentStatus::Rejected),
            "CANCELLED" | "CANCELED" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub time_slot_id: Uuid,
    /// Copied from the slot's start time at booking.
    pub appointment_time: DateTime<Utc>,
    pub note: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub statuses: Option<Vec<AppointmentStatus>>,
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
}

impl AppointmentFilter {
    pub fn with_statuses(statuses: &[AppointmentStatus]) -> Self {
        Self { statuses: Some(statuses.to_vec()), ..Self::default() }
    }

    pub fn for_patient(patient_id: Uuid) -> Self {
        Self { patient_id: Some(patient_id), ..Self::default() }
    }

    pub fn for_doctor(doctor_id: Uuid) -> Self {
        Self { doctor_id: Some(doctor_id), ..Self::default() }
    }
}

impl RecordFilter<Appointment> for AppointmentFilter {
    fn matches(&self, record: &Appointment) -> bool {
        self.statuses.as_ref().map_or(true, |s| s.contains(&record.status))
            && self.patient_id.map_or(true, |p| record.patient_id == p)
            && self.doctor_id.map_or(true, |d| record.doctor_id == d)
    }
}

impl Record for Appointment {
    type Filter = AppointmentFilter;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }
}
