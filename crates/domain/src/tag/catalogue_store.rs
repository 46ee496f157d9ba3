use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::TagTypeMap;
use crate::DomainError;

/// Durable tier of the tag-list cache: one record per device ID.
///
/// Implementations live in the infrastructure layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueStore: Send + Sync {
    /// When the record for `device_id` was last written, if there is one
    async fn modified_at(&self, device_id: &str) -> Result<Option<DateTime<Utc>>, DomainError>;

    /// Read the record for `device_id`
    async fn load(&self, device_id: &str) -> Result<Option<TagTypeMap>, DomainError>;

    /// Replace the record for `device_id` in one step and return its new timestamp
    async fn save(&self, device_id: &str, entries: &TagTypeMap)
    -> Result<DateTime<Utc>, DomainError>;

    /// Drop every record. Returns how many were removed.
    async fn reset(&self) -> Result<usize, DomainError>;
}
