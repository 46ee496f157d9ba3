#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use application::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    CatalogueStore, DeviceConfig, DeviceGateway, DomainError, PlcAddress, PlcValue,
    TagCatalogueEntry, TagReadBatch, TagTypeMap, TagValueResult,
};

pub fn device(id: &str) -> DeviceConfig {
    DeviceConfig::new(id, PlcAddress::new("127.0.0.1", 44818, 0))
}

pub fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn type_map(pairs: &[(&str, &str)]) -> TagTypeMap {
    pairs
        .iter()
        .map(|(name, ty)| (name.to_string(), TagCatalogueEntry::new(*ty)))
        .collect()
}

// --- Counting gateway with optional delay and fault injection ---

pub struct CountingGateway {
    catalogue: TagTypeMap,
    values: BTreeMap<String, PlcValue>,
    delay: Duration,
    list_calls: AtomicUsize,
    read_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_read: AtomicBool,
    last_read: Mutex<Vec<String>>,
}

impl CountingGateway {
    pub fn new(catalogue: TagTypeMap) -> Self {
        Self {
            catalogue,
            values: BTreeMap::new(),
            delay: Duration::ZERO,
            list_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_read: AtomicBool::new(false),
            last_read: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_value(mut self, tag: &str, value: impl Into<PlcValue>) -> Self {
        self.values.insert(tag.to_string(), value.into());
        self
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_read(&self, fail: bool) {
        self.fail_read.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn last_read(&self) -> Vec<String> {
        self.last_read.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceGateway for CountingGateway {
    async fn list_tags(&self, _device: &DeviceConfig) -> Result<TagTypeMap, DomainError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DomainError::Driver("connection refused".into()));
        }
        Ok(self.catalogue.clone())
    }

    async fn read_tags(
        &self,
        _device: &DeviceConfig,
        tags: &[String],
    ) -> Result<TagReadBatch, DomainError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_read.lock().unwrap() = tags.to_vec();
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(DomainError::Driver("read timeout".into()));
        }

        let results = tags
            .iter()
            .map(|name| match self.values.get(name) {
                Some(value) => TagValueResult::ok(name.clone(), value.clone()),
                None => TagValueResult::failed(name.clone(), "Path destination unknown"),
            })
            .collect();
        Ok(TagReadBatch::new(results, Utc::now()))
    }

    fn gateway_type(&self) -> &str {
        "Counting"
    }
}

// --- In-memory catalogue store stamped by a test clock ---

pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<String, (TagTypeMap, DateTime<Utc>)>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn put(&self, device_id: &str, entries: TagTypeMap, modified_at: DateTime<Utc>) {
        self.records
            .lock()
            .unwrap()
            .insert(device_id.to_string(), (entries, modified_at));
    }

    pub fn get(&self, device_id: &str) -> Option<(TagTypeMap, DateTime<Utc>)> {
        self.records.lock().unwrap().get(device_id).cloned()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogueStore for MemoryStore {
    async fn modified_at(&self, device_id: &str) -> Result<Option<DateTime<Utc>>, DomainError> {
        Ok(self.get(device_id).map(|(_, ts)| ts))
    }

    async fn load(&self, device_id: &str) -> Result<Option<TagTypeMap>, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(device_id).map(|(entries, _)| entries))
    }

    async fn save(
        &self,
        device_id: &str,
        entries: &TagTypeMap,
    ) -> Result<DateTime<Utc>, DomainError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let now = self.clock.now();
        self.put(device_id, entries.clone(), now);
        Ok(now)
    }

    async fn reset(&self) -> Result<usize, DomainError> {
        let mut records = self.records.lock().unwrap();
        let count = records.len();
        records.clear();
        Ok(count)
    }
}
