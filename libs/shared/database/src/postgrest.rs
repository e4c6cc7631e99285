use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentFilter, AppointmentStatus, Doctor, DoctorFilter, Record, TimeSlot,
    TimeSlotFilter, User, UserFilter,
};

use crate::store::{AppointmentStore, Repository, StoreError, StoreResult, TimeSlotStore};
use crate::supabase::{SupabaseClient, SupabaseError};

/// How a record kind maps onto a PostgREST table.
pub trait TableMapping: Record {
    const TABLE: &'static str;
    const KIND: &'static str;
    const ORDER_BY: &'static str;

    /// PostgREST horizontal filters (`column=op.value`) for a list query.
    fn filter_query(filter: &Self::Filter) -> Vec<String>;
}

fn eq(column: &str, value: impl Display) -> String {
    format!("{}=eq.{}", column, urlencoding::encode(&value.to_string()))
}

fn gt(column: &str, value: &DateTime<Utc>) -> String {
    format!("{}=gt.{}", column, urlencoding::encode(&value.to_rfc3339()))
}

impl TableMapping for User {
    const TABLE: &'static str = "users";
    const KIND: &'static str = "User";
    const ORDER_BY: &'static str = "created_at.asc,id.asc";

    fn filter_query(filter: &UserFilter) -> Vec<String> {
        filter.username.iter().map(|u| eq("username", u)).collect()
    }
}

impl TableMapping for Doctor {
    const TABLE: &'static str = "doctors";
    const KIND: &'static str = "Doctor";
    const ORDER_BY: &'static str = "created_at.asc,id.asc";

    fn filter_query(filter: &DoctorFilter) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(enabled) = filter.enabled {
            parts.push(eq("enabled", enabled));
        }
        if let Some(specialty) = &filter.specialty {
            parts.push(eq("specialty", specialty));
        }
        parts
    }
}

impl TableMapping for TimeSlot {
    const TABLE: &'static str = "time_slots";
    const KIND: &'static str = "TimeSlot";
    const ORDER_BY: &'static str = "start_time.asc,id.asc";

    fn filter_query(filter: &TimeSlotFilter) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(doctor_id) = filter.doctor_id {
            parts.push(eq("doctor_id", doctor_id));
        }
        if let Some(available) = filter.available {
            parts.push(eq("available", available));
        }
        if let Some(after) = &filter.starts_after {
            parts.push(gt("start_time", after));
        }
        parts
    }
}

impl TableMapping for Appointment {
    const TABLE: &'static str = "appointments";
    const KIND: &'static str = "Appointment";
    const ORDER_BY: &'static str = "created_at.asc,id.asc";

    fn filter_query(filter: &AppointmentFilter) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(statuses) = &filter.statuses {
            let list: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
            parts.push(format!("status=in.({})", list.join(",")));
        }
        if let Some(patient_id) = filter.patient_id {
            parts.push(eq("patient_id", patient_id));
        }
        if let Some(doctor_id) = filter.doctor_id {
            parts.push(eq("doctor_id", doctor_id));
        }
        parts
    }
}

/// Record table served by Supabase's PostgREST API.
pub struct SupabaseTable<T: TableMapping> {
    supabase: Arc<SupabaseClient>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: TableMapping> SupabaseTable<T> {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase, _kind: PhantomData }
    }

    fn path(query: &[String]) -> String {
        if query.is_empty() {
            format!("/rest/v1/{}", T::TABLE)
        } else {
            format!("/rest/v1/{}?{}", T::TABLE, query.join("&"))
        }
    }

    fn row_path(id: Uuid) -> String {
        Self::path(&[eq("id", id)])
    }

    fn map_error(err: anyhow::Error, id: Option<Uuid>) -> StoreError {
        match (err.downcast_ref::<SupabaseError>(), id) {
            (Some(SupabaseError::Conflict(msg)), _) => StoreError::Conflict(msg.clone()),
            (Some(SupabaseError::NotFound(_)), Some(id)) => StoreError::NotFound { kind: T::KIND, id },
            _ => StoreError::Backend(err.to_string()),
        }
    }

    /// Conditional write: PATCH the rows matching `query`, echoing them back.
    async fn patch_where(&self, query: &[String], body: serde_json::Value) -> StoreResult<Vec<T>> {
        self.supabase
            .request_with_headers(
                Method::PATCH,
                &Self::path(query),
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| Self::map_error(e, None))
    }

    /// An empty conditional write means either the row is gone or the guard
    /// column no longer holds the expected value.
    async fn explain_missed_patch(&self, id: Uuid, conflict: String) -> StoreError {
        match self.get(id).await {
            Ok(Some(_)) => StoreError::Conflict(conflict),
            Ok(None) => StoreError::NotFound { kind: T::KIND, id },
            Err(e) => e,
        }
    }
}

#[async_trait]
impl<T: TableMapping> Repository<T> for SupabaseTable<T> {
    async fn insert(&self, record: T) -> StoreResult<T> {
        let id = record.id();
        let body = serde_json::to_value(&record)?;

        let rows: Vec<T> = self
            .supabase
            .request_with_headers(
                Method::POST,
                &Self::path(&[]),
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| Self::map_error(e, Some(id)))?;

        debug!("Inserted {} {} into {}", T::KIND, id, T::TABLE);
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend(format!("insert into {} returned no rows", T::TABLE)))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<T>> {
        let rows: Vec<T> = self
            .supabase
            .request(Method::GET, &Self::row_path(id), None)
            .await
            .map_err(|e| Self::map_error(e, None))?;

        Ok(rows.into_iter().next())
    }

    async fn list(&self, filter: &T::Filter) -> StoreResult<Vec<T>> {
        let mut query = T::filter_query(filter);
        query.push(format!("order={}", T::ORDER_BY));

        self.supabase
            .request(Method::GET, &Self::path(&query), None)
            .await
            .map_err(|e| Self::map_error(e, None))
    }

    async fn update(&self, record: T) -> StoreResult<T> {
        let id = record.id();
        let body = serde_json::to_value(&record)?;

        self.patch_where(&[eq("id", id)], body)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { kind: T::KIND, id })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let rows: Vec<T> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &Self::row_path(id),
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| Self::map_error(e, Some(id)))?;

        if rows.is_empty() {
            return Err(StoreError::NotFound { kind: T::KIND, id });
        }
        Ok(())
    }
}

#[async_trait]
impl TimeSlotStore for SupabaseTable<TimeSlot> {
    async fn occupy(&self, slot_id: Uuid) -> StoreResult<TimeSlot> {
        let rows = self
            .patch_where(
                &[eq("id", slot_id), eq("available", true)],
                json!({ "available": false }),
            )
            .await?;

        match rows.into_iter().next() {
            Some(slot) => Ok(slot),
            None => {
                warn!("Occupy of time slot {} matched no available row", slot_id);
                Err(self
                    .explain_missed_patch(slot_id, format!("time slot {} already booked", slot_id))
                    .await)
            }
        }
    }

    async fn release(&self, slot_id: Uuid) -> StoreResult<TimeSlot> {
        self.patch_where(&[eq("id", slot_id)], json!({ "available": true }))
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { kind: "TimeSlot", id: slot_id })
    }
}

#[async_trait]
impl AppointmentStore for SupabaseTable<Appointment> {
    async fn transition_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> StoreResult<Appointment> {
        let rows = self
            .patch_where(
                &[eq("id", id), eq("status", expected)],
                json!({ "status": next, "updated_at": Utc::now() }),
            )
            .await?;

        match rows.into_iter().next() {
            Some(appointment) => Ok(appointment),
            None => Err(self
                .explain_missed_patch(id, format!("appointment {} is no longer {}", id, expected))
                .await),
        }
    }
}
