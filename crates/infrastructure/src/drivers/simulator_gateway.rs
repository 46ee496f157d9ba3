use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use domain::{
    DeviceConfig, DeviceGateway, DomainError, PlcValue, TagCatalogueEntry, TagReadBatch,
    TagTypeMap, TagValueResult,
};
use tokio::time::sleep;
use tracing::debug;

use crate::config::SimulatorSettings;

/// Status reported for a tag the controller does not have
pub const UNKNOWN_TAG_STATUS: &str = "Path destination unknown";

/// In-process stand-in for a PLC: every device exposes the same configured
/// tags and produces values derived from the elapsed time.
pub struct SimulatorGateway {
    tags: BTreeMap<String, String>,
    latency: Duration,
    offline_devices: HashSet<String>,
    start_time: Instant,
}

impl SimulatorGateway {
    pub fn new(settings: &SimulatorSettings) -> Self {
        Self {
            tags: settings
                .tags
                .iter()
                .map(|t| (t.name.clone(), t.data_type.clone()))
                .collect(),
            latency: Duration::from_millis(settings.latency_ms),
            offline_devices: settings.offline_devices.iter().cloned().collect(),
            start_time: Instant::now(),
        }
    }

    async fn connect(&self, device: &DeviceConfig) -> Result<(), DomainError> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        if self.offline_devices.contains(&device.id) {
            return Err(DomainError::Driver(format!(
                "No response from {} ({})",
                device.id, device.address
            )));
        }
        Ok(())
    }

    fn generate_value(&self, data_type: &str) -> PlcValue {
        let elapsed = self.start_time.elapsed().as_secs_f64();

        match data_type.to_ascii_uppercase().as_str() {
            "REAL" | "LREAL" => {
                // Sine wave between 0 and 100, period 10 seconds
                let frequency = 0.1;
                let raw = 50.0 + 50.0 * (elapsed * frequency * 2.0 * std::f64::consts::PI).sin();
                PlcValue::Float((raw * 100.0).round() / 100.0)
            }
            "SINT" | "INT" | "DINT" | "LINT" | "USINT" | "UINT" | "UDINT" => {
                PlcValue::Int(elapsed as i64)
            }
            "BOOL" => PlcValue::Bool((elapsed as i64 / 5) % 2 == 0),
            "STRING" => PlcValue::Text(format!("SIM {:.0}", elapsed)),
            _ => PlcValue::Struct(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl DeviceGateway for SimulatorGateway {
    async fn list_tags(&self, device: &DeviceConfig) -> Result<TagTypeMap, DomainError> {
        self.connect(device).await?;

        debug!(device_id = %device.id, tags = self.tags.len(), "Simulator listed tags");
        Ok(self
            .tags
            .iter()
            .map(|(name, data_type)| (name.clone(), TagCatalogueEntry::new(data_type.clone())))
            .collect())
    }

    async fn read_tags(
        &self,
        device: &DeviceConfig,
        tags: &[String],
    ) -> Result<TagReadBatch, DomainError> {
        self.connect(device).await?;

        let results = tags
            .iter()
            .map(|name| match self.tags.get(name) {
                Some(data_type) => TagValueResult::ok(name.clone(), self.generate_value(data_type)),
                None => TagValueResult::failed(name.clone(), UNKNOWN_TAG_STATUS),
            })
            .collect();

        Ok(TagReadBatch::new(results, Utc::now()))
    }

    fn gateway_type(&self) -> &str {
        "Simulator"
    }
}
