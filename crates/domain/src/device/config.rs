use serde::{Deserialize, Serialize};

/// Default EtherNet/IP port used by Logix controllers
pub const DEFAULT_PLC_PORT: u16 = 44818;

fn default_port() -> u16 {
    DEFAULT_PLC_PORT
}

/// Network location of a controller: host, TCP port and backplane slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlcAddress {
    pub ip: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub slot: u8,
}

impl PlcAddress {
    pub fn new(ip: impl Into<String>, port: u16, slot: u8) -> Self {
        Self {
            ip: ip.into(),
            port,
            slot,
        }
    }
}

impl std::fmt::Display for PlcAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.ip, self.port, self.slot)
    }
}

/// Configuration of one PLC as loaded from the device configuration file.
///
/// Matches the JSON:
/// ```json
/// {
///   "id": "some-plc-id",
///   "ip": "10.0.0.5",
///   "port": 44818,
///   "slot": 0,
///   "allow_tags": ["TAG1", "TAG2"],
///   "exclude_tags": ["TAG3"],
///   "allow_tags_regex": "",
///   "exclude_tags_regex": "",
///   "rate_limit": "10/second"
/// }
/// ```
///
/// Policy fields default to empty. An empty policy lets every tag through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    #[serde(flatten)]
    pub address: PlcAddress,
    #[serde(default)]
    pub allow_tags: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
    #[serde(default)]
    pub allow_tags_regex: String,
    #[serde(default)]
    pub exclude_tags_regex: String,
    /// Carried for the HTTP layer; not enforced by the gateway core.
    #[serde(default)]
    pub rate_limit: String,
}

impl DeviceConfig {
    pub fn new(id: impl Into<String>, address: PlcAddress) -> Self {
        Self {
            id: id.into(),
            address,
            allow_tags: Vec::new(),
            exclude_tags: Vec::new(),
            allow_tags_regex: String::new(),
            exclude_tags_regex: String::new(),
            rate_limit: String::new(),
        }
    }

    pub fn with_allow_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allow_regex(mut self, pattern: impl Into<String>) -> Self {
        self.allow_tags_regex = pattern.into();
        self
    }

    pub fn with_exclude_regex(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_tags_regex = pattern.into();
        self
    }
}

/// A named, pre-defined list of tags read from a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub id: String,
    #[serde(rename = "plc_id", alias = "device_id")]
    pub device_id: String,
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub rate_limit: String,
}

impl BatchConfig {
    pub fn new<I, S>(id: impl Into<String>, device_id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            device_id: device_id.into(),
            tag_list: tags.into_iter().map(Into::into).collect(),
            rate_limit: String::new(),
        }
    }
}
