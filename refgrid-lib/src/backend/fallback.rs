//! Primary-then-local backend combinator

use std::sync::Arc;

use async_trait::async_trait;

use super::CrudBackend;
use super::MemoryBackend;
use crate::error::ApiError;
use crate::model::Endpoints;
use crate::model::Entity;

/// Serves each call from a primary backend, or from a local
/// [`MemoryBackend`] when the primary fails.
///
/// Local writes are never replayed against the primary.
pub struct FallbackBackend {
    primary: Arc<dyn CrudBackend>,
    local: MemoryBackend,
}

impl FallbackBackend {
    /// Wraps `primary` with an explicit local store.
    pub fn new(primary: impl CrudBackend + 'static, local: MemoryBackend) -> Self {
        Self {
            primary: Arc::new(primary),
            local,
        }
    }

    /// Wraps `primary` with a local store seeded from the entity's samples.
    pub fn for_entity<E: Entity>(primary: impl CrudBackend + 'static) -> Self {
        Self::new(primary, MemoryBackend::new().with_samples::<E>())
    }

    /// Returns the local store.
    pub fn local(&self) -> &MemoryBackend {
        &self.local
    }
}

#[async_trait]
impl CrudBackend for FallbackBackend {
    async fn list(&self, endpoints: &Endpoints) -> Result<Vec<serde_json::Value>, ApiError> {
        match self.primary.list(endpoints).await {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("Listing {} failed, serving local data: {}", endpoints.list, e);
                self.local.list(endpoints).await
            }
        }
    }

    async fn create(
        &self,
        endpoints: &Endpoints,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        match self.primary.create(endpoints, record.clone()).await {
            Ok(created) => Ok(created),
            Err(e) => {
                log::warn!("Creating in {} failed, creating locally: {}", endpoints.create, e);
                self.local.create(endpoints, record).await
            }
        }
    }

    async fn update(
        &self,
        endpoints: &Endpoints,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        match self.primary.update(endpoints, id, patch.clone()).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                log::warn!("Updating {} failed, updating locally: {}", endpoints.item_path(id), e);
                self.local.update(endpoints, id, patch).await
            }
        }
    }

    async fn delete(&self, endpoints: &Endpoints, id: &str) -> Result<(), ApiError> {
        match self.primary.delete(endpoints, id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("Deleting {} failed, deleting locally: {}", endpoints.item_path(id), e);
                self.local.delete(endpoints, id).await
            }
        }
    }
}
