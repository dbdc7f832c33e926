//! Backend calls issued by a grid.
//!
//! Each request owns a handle to the backend and everything it sends, so it
//! can be awaited while the grid keeps accepting edits. The grid applies the
//! result when the request is handed back to it.

use std::sync::Arc;

use futures::future::join_all;

use crate::backend::CrudBackend;
use crate::error::ApiError;
use crate::model::Endpoints;
use crate::model::Value;

/// JSON form of an identifier: a number when it parses as one.
pub fn id_json(row_id: &str) -> serde_json::Value {
    row_id
        .parse::<i64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::String(row_id.to_string()))
}

/// One cell update in a save batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub row_id: String,
    pub column_id: String,
    /// Value being sent.
    pub value: Value,
}

impl CellUpdate {
    /// `{ <id_field>: id, <column>: value }` with the placeholder sent as `null`.
    pub fn payload(&self, id_field: &str) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(id_field.to_string(), id_json(&self.row_id));
        body.insert(self.column_id.clone(), self.value.to_json());
        serde_json::Value::Object(body)
    }
}

/// Independent update requests for every pending change.
pub struct SaveBatch {
    pub(crate) backend: Arc<dyn CrudBackend>,
    pub(crate) endpoints: Endpoints,
    pub(crate) id_field: &'static str,
    pub(crate) updates: Vec<CellUpdate>,
}

impl SaveBatch {
    pub fn updates(&self) -> &[CellUpdate] {
        &self.updates
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Sends every update and waits for all of them to settle.
    pub async fn run(self) -> SaveOutcome {
        let requests = self.updates.iter().map(|update| {
            self.backend
                .update(&self.endpoints, &update.row_id, update.payload(self.id_field))
        });
        let results = join_all(requests).await;

        SaveOutcome {
            entries: self
                .updates
                .into_iter()
                .zip(results)
                .map(|(update, result)| (update, result.map(|_| ())))
                .collect(),
        }
    }
}

/// Settled results of a [`SaveBatch`], in request order.
#[derive(Debug)]
pub struct SaveOutcome {
    pub(crate) entries: Vec<(CellUpdate, Result<(), ApiError>)>,
}

/// Independent delete requests.
pub struct DeleteBatch {
    pub(crate) backend: Arc<dyn CrudBackend>,
    pub(crate) endpoints: Endpoints,
    pub(crate) ids: Vec<String>,
}

impl DeleteBatch {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Sends every delete and waits for all of them to settle.
    pub async fn run(self) -> DeleteOutcome {
        let requests = self
            .ids
            .iter()
            .map(|id| self.backend.delete(&self.endpoints, id));
        let results = join_all(requests).await;

        DeleteOutcome {
            entries: self.ids.into_iter().zip(results).collect(),
        }
    }
}

/// Settled results of a [`DeleteBatch`].
#[derive(Debug)]
pub struct DeleteOutcome {
    pub(crate) entries: Vec<(String, Result<(), ApiError>)>,
}

/// What a delete batch achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    /// Identifier and error message of each rejected delete.
    pub failed: Vec<(String, String)>,
}

/// A list request.
pub struct FetchRequest {
    pub(crate) backend: Arc<dyn CrudBackend>,
    pub(crate) endpoints: Endpoints,
}

impl FetchRequest {
    pub async fn run(self) -> Result<Vec<serde_json::Value>, ApiError> {
        self.backend.list(&self.endpoints).await
    }
}

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(usize),
    Failed,
}
