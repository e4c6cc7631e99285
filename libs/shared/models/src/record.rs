use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A persisted record kind. Every kind is keyed by an opaque `Uuid` and carries
/// its own filter type for list queries.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Filter: RecordFilter<Self>;

    fn id(&self) -> Uuid;

    /// Listing order: slots by start time, everything else by creation time.
    fn order_key(&self) -> (DateTime<Utc>, Uuid);

    /// Natural key that must be unique across the table, besides the id.
    fn unique_key(&self) -> Option<&str> {
        None
    }
}

/// Typed list filter. An all-`None` filter matches every record.
pub trait RecordFilter<T>: Debug + Default + Clone + Send + Sync + 'static {
    fn matches(&self, record: &T) -> bool;
}
