//! Application setup and initialization
//!
//! Everything that must happen exactly once at process start: config files,
//! database pool, cache, and the router. Invalid configuration aborts startup.

pub mod routes;
pub mod server;
pub mod telemetry;

use anyhow::{Context, Result};
use jsonwebtoken::DecodingKey;
use medius_cache::{LinkCache, RedisCacheStore};
use medius_db::MediaRepository;
use medius_media::{MediaContext, ThumbnailSigner};
use medius_storage::StorageContext;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Initialize the entire application: configs, pool, cache, state, routes.
pub async fn initialize_app(config: &ApiConfig) -> Result<(Arc<AppState>, axum::Router)> {
    let media = MediaContext::from_yaml_file(&config.media_config_file)
        .context("Failed to load media config")?;
    let storage = StorageContext::from_yaml_file(&config.storage_config_file)
        .context("Failed to load storage config")?;

    let thumbnailer = ThumbnailSigner::new(
        config.imgproxy_host.clone(),
        &config.imgproxy_key,
        &config.imgproxy_salt,
        config.imgproxy_enlarge,
    )
    .context("Invalid imgproxy signing config")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let cache_store =
        RedisCacheStore::new(&config.redis_url).context("Failed to create Redis pool")?;
    let links = LinkCache::new(Arc::new(cache_store), "media_link:");

    let state = Arc::new(AppState {
        media,
        storage,
        links,
        repository: MediaRepository::new(pool),
        thumbnailer,
        jwt_decoding_key: DecodingKey::from_secret(config.jwt_decode_key.as_bytes()),
        service_api_key: config.service_api_key.clone(),
        link_expires_in: Duration::from_secs(config.link_expires_secs),
    });

    tracing::info!(
        media_config = %config.media_config_file,
        storage_config = %config.storage_config_file,
        link_expires_secs = config.link_expires_secs,
        "Configuration loaded"
    );

    let router = routes::build_router(Arc::clone(&state));

    Ok((state, router))
}
