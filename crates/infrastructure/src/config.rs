use std::collections::HashSet;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use domain::{BatchConfig, DeviceConfig, DeviceRegistry, DomainError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::ensure_distinct_cache_files;

/// A tag the simulated gateway reports for every device
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SimulatedTag {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

impl SimulatedTag {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulatorSettings {
    #[serde(default = "default_simulated_tags")]
    pub tags: Vec<SimulatedTag>,
    /// Artificial delay added to every device call
    #[serde(default)]
    pub latency_ms: u64,
    /// Device IDs that behave as unreachable
    #[serde(default)]
    pub offline_devices: Vec<String>,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            tags: default_simulated_tags(),
            latency_ms: 0,
            offline_devices: Vec::new(),
        }
    }
}

fn default_simulated_tags() -> Vec<SimulatedTag> {
    vec![
        SimulatedTag::new("TAG1", "DINT"),
        SimulatedTag::new("TAG2", "REAL"),
        SimulatedTag::new("TAG3", "BOOL"),
        SimulatedTag::new("TAG4", "STRING"),
        SimulatedTag::new("Line1_Speed", "REAL"),
        SimulatedTag::new("Line1_Count", "DINT"),
    ]
}

/// Process settings for the gateway server.
///
/// Kept as a list/scalar-only structure: `config` lower-cases map keys,
/// which would mangle tag names.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cache_directory: String,
    pub cache_ttl_minutes: u64,
    pub device_config_path: String,
    #[serde(default)]
    pub auth_token_file_path: Option<String>,
    #[serde(default)]
    pub simulator: SimulatorSettings,
}

impl ServerSettings {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default settings
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("cache_directory", "plc_tag_cache")?
            .set_default("cache_ttl_minutes", 60)?
            .set_default("device_config_path", "config/plc_config.json")?
            // Shared config file, e.g. config/default.toml
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. PLCGW__PORT=9000)
            .add_source(Environment::with_prefix("PLCGW").separator("__"))
            .build()?;

        let settings: Self = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_minutes == 0 {
            return Err(ConfigError::Message(
                "cache_ttl_minutes must be greater than zero".into(),
            ));
        }
        if ttl_from_minutes(self.cache_ttl_minutes).is_none() {
            return Err(ConfigError::Message(format!(
                "cache_ttl_minutes {} is out of range",
                self.cache_ttl_minutes
            )));
        }
        if self.cache_directory.trim().is_empty() {
            return Err(ConfigError::Message("cache_directory cannot be empty".into()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        ttl_from_minutes(self.cache_ttl_minutes).unwrap_or(chrono::Duration::MAX)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn ttl_from_minutes(minutes: u64) -> Option<chrono::Duration> {
    i64::try_from(minutes)
        .ok()
        .and_then(chrono::Duration::try_minutes)
}

/// The device configuration file: `{ "plc_list": [...], "batch_list": [...] }`
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DeviceConfigFile {
    #[serde(default)]
    pub plc_list: Vec<DeviceConfig>,
    #[serde(default)]
    pub batch_list: Vec<BatchConfig>,
}

impl DeviceConfigFile {
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw)
            .map_err(|e| DomainError::Config(format!("Invalid device configuration: {}", e)))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::Config(format!(
                "Cannot read device configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Build the registry. Device IDs must also map to distinct cache files.
    pub fn into_registry(self) -> Result<DeviceRegistry, DomainError> {
        let registry = DeviceRegistry::new(self.plc_list, self.batch_list)?;
        ensure_distinct_cache_files(registry.devices().map(|device| device.id()))?;
        Ok(registry)
    }
}

/// Read the device configuration file and build the registry from it
pub async fn load_device_registry(path: impl AsRef<Path>) -> Result<DeviceRegistry, DomainError> {
    let path = path.as_ref();
    let registry = DeviceConfigFile::load(path).await?.into_registry()?;
    info!(path = %path.display(), "Loaded device configuration");
    Ok(registry)
}

/// Read the accepted API tokens: a JSON array of strings
pub async fn load_auth_tokens(path: impl AsRef<Path>) -> Result<HashSet<String>, DomainError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::Config(format!("Cannot read token file {}: {}", path.display(), e))
    })?;
    let tokens: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
        DomainError::Config(format!("Invalid token file {}: {}", path.display(), e))
    })?;
    Ok(tokens.into_iter().filter(|t| !t.is_empty()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "plc_list": [
            { "id": "D1", "ip": "10.0.0.1", "allow_tags": ["TAG1", "TAG2"] },
            { "id": "D2", "ip": "10.0.0.2", "port": 2222, "slot": 1, "allow_tags_regex": "Line1_" }
        ],
        "batch_list": [
            { "id": "B1", "plc_id": "D1", "tag_list": ["TAG2", "TAG1"] }
        ]
    }"#;

    #[test]
    fn test_device_file_builds_registry() {
        let registry = DeviceConfigFile::from_json(SAMPLE)
            .unwrap()
            .into_registry()
            .unwrap();

        assert_eq!(registry.device_count(), 2);
        let d2 = registry.find_device("D2").unwrap();
        assert_eq!(d2.config().address.port, 2222);
        assert_eq!(registry.find_batch("B1").unwrap().device_id, "D1");
    }

    #[test]
    fn test_lists_default_to_empty() {
        let file = DeviceConfigFile::from_json("{}").unwrap();
        assert!(file.plc_list.is_empty());
        assert!(file.batch_list.is_empty());
    }

    #[test]
    fn test_malformed_device_file_is_config_error() {
        let err = DeviceConfigFile::from_json(r#"{ "plc_list": [ { "ip": "1.2.3.4" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = ServerSettings {
            host: "127.0.0.1".into(),
            port: 8080,
            cache_directory: "plc_tag_cache".into(),
            cache_ttl_minutes: 10,
            device_config_path: "config/plc_config.json".into(),
            auth_token_file_path: None,
            simulator: SimulatorSettings::default(),
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.cache_ttl(), chrono::Duration::minutes(10));
        assert_eq!(settings.bind_address(), "127.0.0.1:8080");

        settings.cache_ttl_minutes = 0;
        assert!(settings.validate().is_err());

        settings.cache_ttl_minutes = u64::MAX;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ServerSettings::load(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(settings.cache_ttl_minutes, 60);
        assert_eq!(settings.cache_directory, "plc_tag_cache");
        assert!(settings.auth_token_file_path.is_none());
        assert!(!settings.simulator.tags.is_empty());
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
port = 9100
cache_ttl_minutes = 5

[simulator]
latency_ms = 20
tags = [ { name = "Motor_RPM", type = "REAL" } ]
"#,
        )
        .unwrap();

        let settings = ServerSettings::load(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.port, 9100);
        assert_eq!(settings.cache_ttl_minutes, 5);
        assert_eq!(settings.simulator.latency_ms, 20);
        assert_eq!(
            settings.simulator.tags,
            vec![SimulatedTag::new("Motor_RPM", "REAL")]
        );
    }

    #[tokio::test]
    async fn test_load_auth_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        tokio::fs::write(&path, r#"["abc", "def", ""]"#).await.unwrap();

        let tokens = load_auth_tokens(&path).await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("abc"));
    }

    #[tokio::test]
    async fn test_missing_device_file_is_config_error() {
        let err = load_device_registry("/nonexistent/plc_config.json")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }
}
