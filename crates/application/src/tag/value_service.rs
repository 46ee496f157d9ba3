use std::sync::Arc;

use domain::{
    Device, DeviceGateway, DeviceRegistry, DomainError, TagCatalogue, TagReadBatch,
};
use tracing::{debug, info, warn};

use crate::catalogue::TagListCache;
use crate::clock::{Clock, SystemClock};

/// Reads live tag values and annotates them with types from the tag-list cache.
///
/// The ID-level methods are what the HTTP layer calls; they resolve devices
/// and batches through the registry first.
pub struct TagValueService {
    registry: Arc<DeviceRegistry>,
    gateway: Arc<dyn DeviceGateway>,
    cache: Arc<TagListCache>,
    clock: Arc<dyn Clock>,
}

impl TagValueService {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        gateway: Arc<dyn DeviceGateway>,
        cache: Arc<TagListCache>,
    ) -> Self {
        Self::with_clock(registry, gateway, cache, Arc::new(SystemClock))
    }

    pub fn with_clock(
        registry: Arc<DeviceRegistry>,
        gateway: Arc<dyn DeviceGateway>,
        cache: Arc<TagListCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            gateway,
            cache,
            clock,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &TagListCache {
        &self.cache
    }

    /// Filter `tags` by the device policy, read the survivors and attach their types.
    ///
    /// Per-tag failures, unknown or blank names included, stay inside their
    /// results; only a failure of the whole read is an error.
    pub async fn read_values(
        &self,
        device: &Device,
        tags: &[String],
    ) -> Result<TagReadBatch, DomainError> {
        let filtered = device.filter_tags(tags).filtered;
        if filtered.is_empty() {
            debug!(
                device_id = %device.id(),
                requested = tags.len(),
                "No requested tags allowed for device, skipping read"
            );
            return Ok(TagReadBatch::new(Vec::new(), self.clock.now()));
        }

        let mut batch = self
            .gateway
            .read_tags(device.config(), &filtered)
            .await
            .map_err(|e| {
                warn!(device_id = %device.id(), "Tag read failed: {}", e);
                DomainError::device_unavailable(device.id(), e)
            })?;

        let failed = batch.failed_count();
        if failed > 0 {
            info!(
                device_id = %device.id(),
                failed,
                total = batch.results.len(),
                "Some tags could not be read"
            );
        }

        self.annotate_types(device, &mut batch).await;
        Ok(batch)
    }

    /// Best-effort: a missing tag list leaves every `tag_type` empty.
    async fn annotate_types(&self, device: &Device, batch: &mut TagReadBatch) {
        let catalogue = match self.cache.get_catalogue(device.config()).await {
            Ok(catalogue) => catalogue,
            Err(e) => {
                debug!(device_id = %device.id(), "Reading values without types: {}", e);
                return;
            }
        };

        for result in &mut batch.results {
            result.tag_type = catalogue
                .type_of(&result.tag_name)
                .unwrap_or_default()
                .to_string();
        }
    }

    pub async fn get_values(
        &self,
        device_id: &str,
        tags: &[String],
    ) -> Result<TagReadBatch, DomainError> {
        let device = self.registry.find_device(device_id)?;
        self.read_values(&device, tags).await
    }

    pub async fn get_value(
        &self,
        device_id: &str,
        tag_name: &str,
    ) -> Result<TagReadBatch, DomainError> {
        self.get_values(device_id, &[tag_name.to_string()]).await
    }

    /// Read a pre-defined batch in its configured tag order
    pub async fn get_values_for_batch(&self, batch_id: &str) -> Result<TagReadBatch, DomainError> {
        let batch = self.registry.find_batch(batch_id)?;
        let device = self.registry.find_device(&batch.device_id)?;
        self.read_values(&device, &batch.tag_list).await
    }

    pub async fn get_catalogue(&self, device_id: &str) -> Result<Arc<TagCatalogue>, DomainError> {
        let device = self.registry.find_device(device_id)?;
        self.cache.get_catalogue(device.config()).await
    }

    /// Data type of one tag; empty string for unknown devices or tags
    pub async fn get_type(&self, device_id: &str, tag_name: &str) -> String {
        match self.registry.find_device(device_id) {
            Ok(device) => self.cache.get_type(device.config(), tag_name).await,
            Err(_) => String::new(),
        }
    }
}
