pub mod auth;
pub mod error;
pub mod record;
pub mod scheduling;

pub use auth::{User, UserFilter, UserProfile, UserRole};
pub use record::{Record, RecordFilter};
pub use scheduling::{
    Appointment, AppointmentFilter, AppointmentStatus, Doctor, DoctorFilter, TimeSlot,
    TimeSlotFilter,
};
