use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Metadata a device reports for one of its tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCatalogueEntry {
    #[serde(rename = "type")]
    pub data_type: String,
}

impl TagCatalogueEntry {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
        }
    }
}

/// Tag name -> entry. Serialises as `{"TAG1": {"type": "DINT"}, ...}`,
/// which is both the cache file format and the `tag_list` of the API.
pub type TagTypeMap = BTreeMap<String, TagCatalogueEntry>;

/// The full tag list of one device, stamped with when it was produced.
///
/// A catalogue is never edited in place: a refresh builds a new one and
/// swaps it in whole.
#[derive(Debug, Clone, PartialEq)]
pub struct TagCatalogue {
    pub device_id: String,
    pub entries: TagTypeMap,
    pub updated_at: DateTime<Utc>,
}

impl TagCatalogue {
    pub fn new(device_id: impl Into<String>, entries: TagTypeMap, updated_at: DateTime<Utc>) -> Self {
        Self {
            device_id: device_id.into(),
            entries,
            updated_at,
        }
    }

    /// Data type of `tag`, if the device reported it
    pub fn type_of(&self, tag: &str) -> Option<&str> {
        self.entries.get(tag).map(|e| e.data_type.as_str())
    }

    /// Age relative to `now`. A timestamp in the future counts as age zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        age_of(self.updated_at, now)
    }

    /// True while `age < ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        is_within_ttl(self.updated_at, now, ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn age_of(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - timestamp).max(Duration::zero())
}

/// Freshness rule shared by both cache tiers
pub fn is_within_ttl(timestamp: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    age_of(timestamp, now) < ttl
}
