pub mod api;
pub mod auth;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use application::{TagListCache, TagValueService};
use domain::CatalogueStore;
use infrastructure::config::{load_auth_tokens, load_device_registry};
use infrastructure::{FileCatalogueStore, GatewayFactory, ServerSettings};
use state::AppState;
use tracing::{info, warn};

/// Run the startup sequence and return the state the router serves.
///
/// Order: clear the cache directory, load and validate the device file,
/// prime every device's tag list, then load the API tokens. Configuration
/// errors are fatal; devices that cannot be primed only log.
pub async fn setup_app_state(settings: &ServerSettings) -> Result<Arc<AppState>> {
    let store = Arc::new(FileCatalogueStore::new(&settings.cache_directory));
    let removed = store
        .reset()
        .await
        .context("Failed to prepare cache directory")?;
    info!(directory = %settings.cache_directory, removed, "Cache directory ready");

    let registry = Arc::new(
        load_device_registry(&settings.device_config_path)
            .await
            .context("Failed to load device configuration")?,
    );

    let gateway = GatewayFactory::create_gateway(settings);
    let cache = Arc::new(TagListCache::new(
        gateway.clone(),
        store,
        settings.cache_ttl(),
    ));

    let primed = cache.warm(&registry).await;
    info!(
        primed,
        devices = registry.device_count(),
        batches = registry.batch_count(),
        ttl_minutes = settings.cache_ttl_minutes,
        "Tag list cache initialised"
    );

    let auth_tokens = match &settings.auth_token_file_path {
        Some(path) => {
            let tokens = load_auth_tokens(path)
                .await
                .context("Failed to load auth tokens")?;
            info!(tokens = tokens.len(), "API authentication enabled");
            Some(tokens)
        }
        None => {
            warn!("No auth token file configured, API is open to all callers");
            None
        }
    };

    let values = Arc::new(TagValueService::new(registry, gateway, cache));
    Ok(Arc::new(AppState::new(values, auth_tokens)))
}
