use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value read from a controller.
///
/// Serialises as the plain JSON of its shape (`true`, `42`, `1.5`, `"text"`,
/// `[...]`, `{...}`), so API clients never see the variant name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlcValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<PlcValue>),
    Struct(BTreeMap<String, PlcValue>),
}

impl From<bool> for PlcValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PlcValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for PlcValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for PlcValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PlcValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PlcValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Outcome of reading one tag. A failed read keeps its reason in `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagValueResult {
    pub tag_name: String,
    pub value: Option<PlcValue>,
    pub success: bool,
    pub status: String,
    /// Filled in after the read from the device's tag list; empty when unknown
    #[serde(default)]
    pub tag_type: String,
}

impl TagValueResult {
    pub fn ok(tag_name: impl Into<String>, value: impl Into<PlcValue>) -> Self {
        Self {
            tag_name: tag_name.into(),
            value: Some(value.into()),
            success: true,
            status: String::new(),
            tag_type: String::new(),
        }
    }

    pub fn failed(tag_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            value: None,
            success: false,
            status: status.into(),
            tag_type: String::new(),
        }
    }

    pub fn with_type(mut self, tag_type: impl Into<String>) -> Self {
        self.tag_type = tag_type.into();
        self
    }
}

/// Per-tag results of a single read plus the controller's clock at read time
#[derive(Debug, Clone, PartialEq)]
pub struct TagReadBatch {
    pub results: Vec<TagValueResult>,
    pub device_time: DateTime<Utc>,
}

impl TagReadBatch {
    pub fn new(results: Vec<TagValueResult>, device_time: DateTime<Utc>) -> Self {
        Self {
            results,
            device_time,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}
