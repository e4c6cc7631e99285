pub mod doctor;
pub mod timeslot;

pub use doctor::DoctorService;
pub use timeslot::TimeSlotService;
