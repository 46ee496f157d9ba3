use async_trait::async_trait;

use crate::device::DeviceConfig;
use crate::error::DomainError;
use crate::tag::{TagReadBatch, TagTypeMap};

/// Access to a physical controller that infrastructure implementations must provide.
///
/// A device-level failure (unreachable, timeout, protocol error) is an `Err`.
/// A failure that affects only some tags of a read is reported inside the
/// matching `TagValueResult` instead.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Read the full tag list with the data type of every tag
    async fn list_tags(&self, device: &DeviceConfig) -> Result<TagTypeMap, DomainError>;

    /// Read the current values of `tags`, one result per requested name, in order
    async fn read_tags(
        &self,
        device: &DeviceConfig,
        tags: &[String],
    ) -> Result<TagReadBatch, DomainError>;

    /// Short identifier used in logs
    fn gateway_type(&self) -> &str;
}
