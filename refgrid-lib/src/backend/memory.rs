//! In-process CRUD backend

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use dashmap::DashSet;
use tokio::sync::Mutex;

use super::CrudBackend;
use crate::entities::probe;
use crate::error::ApiError;
use crate::model::Endpoints;
use crate::model::Entity;

/// A call the backend has been told to reject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Fault {
    List,
    Create,
    Update { id: String, column: String },
    Delete { id: String },
}

/// Keeps records in memory, keyed by collection.
///
/// Collections are addressed by [`Endpoints::item`], so entities whose list
/// and item paths differ still share one store. Created records get
/// `max(id) + 1`; updates merge the patch into the stored record.
///
/// Calls can be scripted to fail, which is how tests exercise partial batch
/// failures without a network.
///
/// # Example
///
/// ```
/// use refgrid_lib::backend::MemoryBackend;
/// use refgrid_lib::entities::Hospitals;
///
/// let backend = MemoryBackend::new()
///     .with_samples::<Hospitals>()
///     .fail_deletes_for("2");
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    faults: DashSet<Fault>,
    update_calls: AtomicUsize,
}

/// Identifier of a stored record as a string.
fn record_id(record: &serde_json::Value) -> Option<String> {
    probe(record, &["id", "ID"]).map(|id| match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a collection with records.
    pub fn with_records(
        mut self,
        endpoints: &Endpoints,
        records: impl IntoIterator<Item = serde_json::Value>,
    ) -> Self {
        self.collections
            .get_mut()
            .entry(endpoints.item.clone())
            .or_default()
            .extend(records);
        self
    }

    /// Seeds the entity's collection with its sample records.
    pub fn with_samples<E: Entity>(self) -> Self {
        self.with_records(&E::endpoints(), E::sample_records())
    }

    /// Rejects every list call.
    pub fn fail_list(self) -> Self {
        self.faults.insert(Fault::List);
        self
    }

    /// Rejects every create call.
    pub fn fail_creates(self) -> Self {
        self.faults.insert(Fault::Create);
        self
    }

    /// Rejects updates to `id` whose patch touches `column`.
    pub fn fail_updates_for(self, id: impl Into<String>, column: impl Into<String>) -> Self {
        self.faults.insert(Fault::Update {
            id: id.into(),
            column: column.into(),
        });
        self
    }

    /// Rejects deletes of `id`.
    pub fn fail_deletes_for(self, id: impl Into<String>) -> Self {
        self.faults.insert(Fault::Delete { id: id.into() });
        self
    }

    /// Removes every scripted failure.
    pub fn clear_faults(&self) {
        self.faults.clear();
    }

    /// Number of update calls received, including rejected ones.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Returns a copy of a collection's records.
    pub async fn records(&self, endpoints: &Endpoints) -> Vec<serde_json::Value> {
        self.collections
            .lock()
            .await
            .get(&endpoints.item)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns a copy of one record.
    pub async fn record(&self, endpoints: &Endpoints, id: &str) -> Option<serde_json::Value> {
        self.collections
            .lock()
            .await
            .get(&endpoints.item)
            .and_then(|records| {
                records
                    .iter()
                    .find(|r| record_id(r).as_deref() == Some(id))
                    .cloned()
            })
    }

    fn rejected(what: &str) -> ApiError {
        ApiError::http(500, format!("{} rejected", what))
    }
}

#[async_trait]
impl CrudBackend for MemoryBackend {
    async fn list(&self, endpoints: &Endpoints) -> Result<Vec<serde_json::Value>, ApiError> {
        if self.faults.contains(&Fault::List) {
            return Err(Self::rejected("list"));
        }
        Ok(self.records(endpoints).await)
    }

    async fn create(
        &self,
        endpoints: &Endpoints,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        if self.faults.contains(&Fault::Create) {
            return Err(Self::rejected("create"));
        }
        let serde_json::Value::Object(mut fields) = record else {
            return Err(ApiError::parse("record must be a JSON object"));
        };

        let mut collections = self.collections.lock().await;
        let records = collections.entry(endpoints.item.clone()).or_default();
        let next_id = records
            .iter()
            .filter_map(|r| probe(r, &["id", "ID"]).and_then(|id| id.as_i64()))
            .max()
            .unwrap_or(0)
            + 1;
        fields.insert("id".to_string(), serde_json::Value::from(next_id));

        let created = serde_json::Value::Object(fields);
        records.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        endpoints: &Endpoints,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let serde_json::Value::Object(patch) = patch else {
            return Err(ApiError::parse("patch must be a JSON object"));
        };
        let faulted = patch.keys().any(|column| {
            self.faults.contains(&Fault::Update {
                id: id.to_string(),
                column: column.clone(),
            })
        });
        if faulted {
            return Err(Self::rejected("update"));
        }

        let mut collections = self.collections.lock().await;
        let record = collections
            .get_mut(&endpoints.item)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|r| record_id(r).as_deref() == Some(id))
            })
            .ok_or_else(|| ApiError::not_found(&endpoints.item, id))?;

        if let serde_json::Value::Object(fields) = record {
            fields.extend(patch);
        }
        Ok(record.clone())
    }

    async fn delete(&self, endpoints: &Endpoints, id: &str) -> Result<(), ApiError> {
        if self.faults.contains(&Fault::Delete { id: id.to_string() }) {
            return Err(Self::rejected("delete"));
        }

        let mut collections = self.collections.lock().await;
        let records = collections
            .get_mut(&endpoints.item)
            .ok_or_else(|| ApiError::not_found(&endpoints.item, id))?;
        let index = records
            .iter()
            .position(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| ApiError::not_found(&endpoints.item, id))?;
        records.remove(index);
        Ok(())
    }
}
