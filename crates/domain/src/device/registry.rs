use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::{BatchConfig, DeviceConfig, FilteredTags, TagFilter};
use crate::error::{DomainError, Result};

/// A configured PLC together with its compiled tag filter
#[derive(Debug, Clone)]
pub struct Device {
    config: DeviceConfig,
    filter: TagFilter,
}

impl Device {
    pub fn new(config: DeviceConfig) -> Result<Self> {
        if config.id.trim().is_empty() {
            return Err(DomainError::Config("Device ID cannot be empty".into()));
        }
        if config.address.ip.trim().is_empty() {
            return Err(DomainError::Config(format!(
                "Device '{}' has an empty ip",
                config.id
            )));
        }

        let filter = TagFilter::from_config(&config)?;
        Ok(Self { config, filter })
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn filter_tags(&self, tags: &[String]) -> FilteredTags {
        self.filter.apply(tags)
    }
}

/// Immutable set of devices and batches, validated once at startup.
///
/// Iteration order follows the configuration file.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<Arc<Device>>,
    device_index: HashMap<String, usize>,
    batches: HashMap<String, Arc<BatchConfig>>,
}

impl DeviceRegistry {
    /// Build the registry, rejecting duplicate IDs, batches that point at
    /// unknown devices and devices whose filter regex does not compile.
    pub fn new(devices: Vec<DeviceConfig>, batches: Vec<BatchConfig>) -> Result<Self> {
        let mut registry = Self::default();

        for config in devices {
            if registry.device_index.contains_key(&config.id) {
                return Err(DomainError::Config(format!(
                    "Duplicate device id '{}'",
                    config.id
                )));
            }
            let device = Device::new(config)?;
            registry
                .device_index
                .insert(device.id().to_string(), registry.devices.len());
            registry.devices.push(Arc::new(device));
        }

        for batch in batches {
            if batch.id.trim().is_empty() {
                return Err(DomainError::Config("Batch ID cannot be empty".into()));
            }
            if registry.batches.contains_key(&batch.id) {
                return Err(DomainError::Config(format!(
                    "Duplicate batch id '{}'",
                    batch.id
                )));
            }
            if !registry.device_index.contains_key(&batch.device_id) {
                return Err(DomainError::Config(format!(
                    "Batch '{}' references unknown device '{}'",
                    batch.id, batch.device_id
                )));
            }
            registry.batches.insert(batch.id.clone(), Arc::new(batch));
        }

        info!(
            devices = registry.devices.len(),
            batches = registry.batches.len(),
            "Device registry loaded"
        );
        Ok(registry)
    }

    pub fn find_device(&self, device_id: &str) -> Result<Arc<Device>> {
        self.device_index
            .get(device_id)
            .map(|&idx| self.devices[idx].clone())
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))
    }

    pub fn find_batch(&self, batch_id: &str) -> Result<Arc<BatchConfig>> {
        self.batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| DomainError::BatchNotFound(batch_id.to_string()))
    }

    pub fn devices(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.iter()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }
}
