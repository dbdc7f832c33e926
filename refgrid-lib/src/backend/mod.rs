//! CRUD backends
//!
//! A grid talks to its records through [`CrudBackend`]: list, create,
//! update-by-id and delete-by-id against one entity collection. Three
//! implementations are provided:
//!
//! - [`HttpBackend`] forwards calls to a remote REST API.
//! - [`MemoryBackend`] keeps records in process, with scriptable failures.
//! - [`FallbackBackend`] tries a primary backend and serves the call from a
//!   local [`MemoryBackend`] when the primary fails.

mod fallback;
mod http;
mod memory;

pub use fallback::FallbackBackend;
pub use http::*;
pub use memory::MemoryBackend;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::Endpoints;

/// The four calls a grid makes against an entity collection.
///
/// Records travel as raw JSON; normalization is the entity formatter's job.
#[async_trait]
pub trait CrudBackend: Send + Sync {
    /// Returns every record in the collection.
    async fn list(&self, endpoints: &Endpoints) -> Result<Vec<serde_json::Value>, ApiError>;

    /// Creates a record and returns it as stored.
    async fn create(
        &self,
        endpoints: &Endpoints,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError>;

    /// Applies a partial or full field map to the record with the given id.
    async fn update(
        &self,
        endpoints: &Endpoints,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError>;

    /// Deletes the record with the given id.
    async fn delete(&self, endpoints: &Endpoints, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: CrudBackend + ?Sized> CrudBackend for Arc<T> {
    async fn list(&self, endpoints: &Endpoints) -> Result<Vec<serde_json::Value>, ApiError> {
        (**self).list(endpoints).await
    }

    async fn create(
        &self,
        endpoints: &Endpoints,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        (**self).create(endpoints, record).await
    }

    async fn update(
        &self,
        endpoints: &Endpoints,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        (**self).update(endpoints, id, patch).await
    }

    async fn delete(&self, endpoints: &Endpoints, id: &str) -> Result<(), ApiError> {
        (**self).delete(endpoints, id).await
    }
}
