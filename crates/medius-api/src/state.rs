//! Shared application state, built once at startup and injected into
//! handlers through `State<Arc<AppState>>`.

use jsonwebtoken::DecodingKey;
use medius_cache::LinkCache;
use medius_db::MediaRepository;
use medius_media::{MediaContext, ThumbnailSigner};
use medius_storage::StorageContext;
use std::time::Duration;

pub struct AppState {
    pub media: MediaContext,
    pub storage: StorageContext,
    pub links: LinkCache,
    pub repository: MediaRepository,
    pub thumbnailer: ThumbnailSigner,
    pub jwt_decoding_key: DecodingKey,
    pub service_api_key: String,
    pub link_expires_in: Duration,
}
