use std::sync::{Arc, PoisonError, RwLock};

use chrono::Duration;
use dashmap::DashMap;
use domain::tag::is_within_ttl;
use domain::{
    CatalogueStore, DeviceConfig, DeviceGateway, DeviceRegistry, DomainError, TagCatalogue,
};
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};

/// Per-device slot: the current catalogue plus the lock that serialises refreshes
#[derive(Default)]
struct CatalogueCell {
    snapshot: RwLock<Option<Arc<TagCatalogue>>>,
    refresh: Mutex<()>,
}

impl CatalogueCell {
    fn current(&self) -> Option<Arc<TagCatalogue>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in `catalogue`, never moving the freshness timestamp backwards
    fn install(&self, mut catalogue: TagCatalogue) -> Arc<TagCatalogue> {
        let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.as_ref() {
            if previous.updated_at > catalogue.updated_at {
                catalogue.updated_at = previous.updated_at;
            }
        }
        let catalogue = Arc::new(catalogue);
        *slot = Some(catalogue.clone());
        catalogue
    }

    fn clear(&self) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Two-tier (memory, then disk) cache of every device's tag list, with
/// fetch-through to the device when both tiers are missing or stale.
///
/// Concurrent callers for one device queue on that device's refresh lock and
/// re-check memory once they get it, so a burst of misses produces a single
/// `list_tags` call. Devices never wait on each other.
pub struct TagListCache {
    gateway: Arc<dyn DeviceGateway>,
    store: Arc<dyn CatalogueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cells: DashMap<String, Arc<CatalogueCell>>,
}

impl TagListCache {
    pub fn new(
        gateway: Arc<dyn DeviceGateway>,
        store: Arc<dyn CatalogueStore>,
        ttl: Duration,
    ) -> Self {
        Self::with_clock(gateway, store, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        gateway: Arc<dyn DeviceGateway>,
        store: Arc<dyn CatalogueStore>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            store,
            clock,
            ttl,
            cells: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn cell(&self, device_id: &str) -> Arc<CatalogueCell> {
        if let Some(cell) = self.cells.get(device_id) {
            return Arc::clone(cell.value());
        }
        Arc::clone(self.cells.entry(device_id.to_string()).or_default().value())
    }

    fn fresh(&self, cell: &CatalogueCell) -> Option<Arc<TagCatalogue>> {
        cell.current()
            .filter(|catalogue| catalogue.is_fresh(self.clock.now(), self.ttl))
    }

    /// Tag list of `device`, from memory, disk or the device itself.
    ///
    /// Fails with `CatalogueUnavailable` when both tiers miss and the device
    /// call fails or returns nothing. Cached state is left as it was.
    pub async fn get_catalogue(
        &self,
        device: &DeviceConfig,
    ) -> Result<Arc<TagCatalogue>, DomainError> {
        let cell = self.cell(&device.id);

        if let Some(catalogue) = self.fresh(&cell) {
            return Ok(catalogue);
        }

        let _refresh = cell.refresh.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(catalogue) = self.fresh(&cell) {
            debug!(device_id = %device.id, "Tag list refreshed by concurrent request");
            return Ok(catalogue);
        }

        if let Some(catalogue) = self.load_from_disk(&device.id).await {
            debug!(device_id = %device.id, tags = catalogue.len(), "Tag list served from disk cache");
            return Ok(cell.install(catalogue));
        }

        self.fetch_through(device, &cell).await
    }

    /// Data type of `tag` on `device`, or an empty string when it cannot be determined
    pub async fn get_type(&self, device: &DeviceConfig, tag: &str) -> String {
        match self.get_catalogue(device).await {
            Ok(catalogue) => catalogue.type_of(tag).unwrap_or_default().to_string(),
            Err(e) => {
                debug!(device_id = %device.id, tag, "Tag type unavailable: {}", e);
                String::new()
            }
        }
    }

    /// Prime every configured device. Failures are logged and skipped.
    /// Returns how many devices now have a tag list.
    pub async fn warm(&self, registry: &DeviceRegistry) -> usize {
        let attempts = registry.devices().map(|device| async move {
            match self.get_catalogue(device.config()).await {
                Ok(catalogue) => {
                    info!(device_id = %device.id(), tags = catalogue.len(), "Tag list primed");
                    true
                }
                Err(e) => {
                    error!(device_id = %device.id(), "Failed to prime tag list: {}", e);
                    false
                }
            }
        });

        let primed = join_all(attempts).await.into_iter().filter(|ok| *ok).count();
        info!(
            primed,
            total = registry.device_count(),
            "Tag list warm-up finished"
        );
        primed
    }

    /// Current in-memory catalogue of `device_id`, fresh or not
    pub fn cached(&self, device_id: &str) -> Option<Arc<TagCatalogue>> {
        self.cells.get(device_id).and_then(|cell| cell.current())
    }

    /// Drop the in-memory tier for `device_id`; the disk tier is untouched
    pub fn invalidate_memory(&self, device_id: &str) {
        if let Some(cell) = self.cells.get(device_id) {
            cell.clear();
        }
    }

    async fn load_from_disk(&self, device_id: &str) -> Option<TagCatalogue> {
        let modified_at = match self.store.modified_at(device_id).await {
            Ok(Some(ts)) => ts,
            Ok(None) => return None,
            Err(e) => {
                warn!(device_id = %device_id, "Disk cache unreadable, treating as miss: {}", e);
                return None;
            }
        };

        if !is_within_ttl(modified_at, self.clock.now(), self.ttl) {
            debug!(device_id = %device_id, %modified_at, "Disk cache stale");
            return None;
        }

        match self.store.load(device_id).await {
            Ok(Some(entries)) if !entries.is_empty() => {
                Some(TagCatalogue::new(device_id, entries, modified_at))
            }
            Ok(_) => None,
            Err(e) => {
                warn!(device_id = %device_id, "Disk cache unreadable, treating as miss: {}", e);
                None
            }
        }
    }

    async fn fetch_through(
        &self,
        device: &DeviceConfig,
        cell: &CatalogueCell,
    ) -> Result<Arc<TagCatalogue>, DomainError> {
        info!(
            device_id = %device.id,
            address = %device.address,
            gateway = self.gateway.gateway_type(),
            "Fetching tag list from device"
        );

        let entries = self.gateway.list_tags(device).await.map_err(|e| {
            warn!(device_id = %device.id, "Tag list fetch failed: {}", e);
            DomainError::catalogue_unavailable(&device.id, e)
        })?;

        if entries.is_empty() {
            warn!(device_id = %device.id, "Device returned an empty tag list");
            return Err(DomainError::catalogue_unavailable(
                &device.id,
                "device returned an empty tag list",
            ));
        }

        let updated_at = match self.store.save(&device.id, &entries).await {
            Ok(written_at) => written_at,
            Err(e) => {
                warn!(device_id = %device.id, "Failed to persist tag list, keeping it in memory only: {}", e);
                self.clock.now()
            }
        };

        let catalogue = cell.install(TagCatalogue::new(device.id.clone(), entries, updated_at));
        info!(device_id = %device.id, tags = catalogue.len(), "Tag list refreshed");
        Ok(catalogue)
    }
}
