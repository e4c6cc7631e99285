use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};
use shared_models::{Appointment, AppointmentStatus, Doctor, Record, TimeSlot, User};

use crate::memory::MemoryTable;
use crate::postgrest::SupabaseTable;
use crate::supabase::SupabaseClient;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-entity persistence interface.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Fails with `Conflict` when a record with the same id already exists.
    async fn insert(&self, record: T) -> StoreResult<T>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<T>>;

    async fn list(&self, filter: &T::Filter) -> StoreResult<Vec<T>>;

    /// Full overwrite; fails with `NotFound` when the id is absent.
    async fn update(&self, record: T) -> StoreResult<T>;

    /// Fails with `NotFound` when the id is absent.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Time slot persistence plus the availability toggles used by booking.
#[async_trait]
pub trait TimeSlotStore: Repository<TimeSlot> {
    /// Atomically flips `available` from true to false.
    /// `NotFound` if the slot is absent, `Conflict` if it is already occupied.
    async fn occupy(&self, slot_id: Uuid) -> StoreResult<TimeSlot>;

    /// Sets `available` back to true. `NotFound` if the slot is absent.
    async fn release(&self, slot_id: Uuid) -> StoreResult<TimeSlot>;
}

/// Appointment persistence plus a compare-and-set on the status field.
#[async_trait]
pub trait AppointmentStore: Repository<Appointment> {
    /// Moves the appointment to `next` only if its current status is `expected`.
    /// `NotFound` if absent, `Conflict` if the current status differs.
    async fn transition_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> StoreResult<Appointment>;
}

/// The injected Record Store: one handle per record kind.
#[derive(Clone)]
pub struct RecordStore {
    pub users: Arc<dyn Repository<User>>,
    pub doctors: Arc<dyn Repository<Doctor>>,
    pub time_slots: Arc<dyn TimeSlotStore>,
    pub appointments: Arc<dyn AppointmentStore>,
}

impl RecordStore {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryTable::<User>::new()),
            doctors: Arc::new(MemoryTable::<Doctor>::new()),
            time_slots: Arc::new(MemoryTable::<TimeSlot>::new()),
            appointments: Arc::new(MemoryTable::<Appointment>::new()),
        }
    }

    pub fn supabase(config: &AppConfig) -> Self {
        let client = Arc::new(SupabaseClient::new(config));

        Self {
            users: Arc::new(SupabaseTable::<User>::new(Arc::clone(&client))),
            doctors: Arc::new(SupabaseTable::<Doctor>::new(Arc::clone(&client))),
            time_slots: Arc::new(SupabaseTable::<TimeSlot>::new(Arc::clone(&client))),
            appointments: Arc::new(SupabaseTable::<Appointment>::new(client)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.storage_backend {
            StorageBackend::Memory => {
                info!("Using in-memory record store");
                Self::in_memory()
            }
            StorageBackend::Supabase => {
                info!("Using Supabase record store at {}", config.supabase_url);
                Self::supabase(config)
            }
        }
    }
}
