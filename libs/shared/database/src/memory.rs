use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Appointment, AppointmentStatus, Record, RecordFilter, TimeSlot};

use crate::store::{AppointmentStore, Repository, StoreError, StoreResult, TimeSlotStore};

/// Process-local table. Every write takes the table's write guard, so a
/// read-check-write sequence inside one guard is serialized against all
/// other writers of the same table.
pub struct MemoryTable<T: Record> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_of<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryTable<T> {
    async fn insert(&self, record: T) -> StoreResult<T> {
        let mut rows = self.rows.write().await;
        let id = record.id();

        if rows.contains_key(&id) {
            return Err(StoreError::Conflict(format!("{} {} already exists", kind_of::<T>(), id)));
        }

        if let Some(key) = record.unique_key() {
            if rows.values().any(|r| r.unique_key() == Some(key)) {
                return Err(StoreError::Conflict(format!("{} {} already exists", kind_of::<T>(), key)));
            }
        }

        rows.insert(id, record.clone());
        debug!("Inserted {} {}", kind_of::<T>(), id);
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<T>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &T::Filter) -> StoreResult<Vec<T>> {
        let rows = self.rows.read().await;
        let mut matched: Vec<T> = rows.values().filter(|r| filter.matches(r)).cloned().collect();
        matched.sort_by_key(|r| r.order_key());
        Ok(matched)
    }

    async fn update(&self, record: T) -> StoreResult<T> {
        let mut rows = self.rows.write().await;
        let id = record.id();

        if let Some(key) = record.unique_key() {
            if rows.values().any(|r| r.id() != id && r.unique_key() == Some(key)) {
                return Err(StoreError::Conflict(format!("{} {} already exists", kind_of::<T>(), key)));
            }
        }

        match rows.get_mut(&id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound { kind: kind_of::<T>(), id }),
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: kind_of::<T>(), id })
    }
}

#[async_trait]
impl TimeSlotStore for MemoryTable<TimeSlot> {
    async fn occupy(&self, slot_id: Uuid) -> StoreResult<TimeSlot> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .get_mut(&slot_id)
            .ok_or(StoreError::NotFound { kind: "TimeSlot", id: slot_id })?;

        if !slot.available {
            return Err(StoreError::Conflict(format!("time slot {} already booked", slot_id)));
        }

        slot.available = false;
        Ok(slot.clone())
    }

    async fn release(&self, slot_id: Uuid) -> StoreResult<TimeSlot> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .get_mut(&slot_id)
            .ok_or(StoreError::NotFound { kind: "TimeSlot", id: slot_id })?;

        slot.available = true;
        Ok(slot.clone())
    }
}

#[async_trait]
impl AppointmentStore for MemoryTable<Appointment> {
    async fn transition_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> StoreResult<Appointment> {
        let mut rows = self.rows.write().await;
        let appointment = rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "Appointment", id })?;

        if appointment.status != expected {
            return Err(StoreError::Conflict(format!(
                "appointment {} is {}, expected {}",
                id, appointment.status, expected
            )));
        }

        appointment.status = next;
        appointment.updated_at = Utc::now();
        Ok(appointment.clone())
    }
}
