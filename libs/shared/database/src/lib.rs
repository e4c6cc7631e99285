pub mod memory;
pub mod postgrest;
pub mod state;
pub mod store;
pub mod supabase;

pub use state::AppState;
pub use store::{
    AppointmentStore, RecordStore, Repository, StoreError, StoreResult, TimeSlotStore,
};
