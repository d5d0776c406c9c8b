//! Environment configuration for the API binary.
//!
//! The YAML files (media policy, storages) carry the domain configuration;
//! everything process-level comes from the environment.

use anyhow::{Context, Result};
use std::env;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_LINK_EXPIRES_SECS: u64 = 3600;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub redis_url: String,
    pub media_config_file: String,
    pub storage_config_file: String,
    pub jwt_decode_key: String,
    pub service_api_key: String,
    pub imgproxy_host: String,
    pub imgproxy_key: String,
    pub imgproxy_salt: String,
    pub imgproxy_enlarge: bool,
    /// Validity window of presigned original links, in seconds.
    pub link_expires_secs: u64,
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} not configured", name))
}

fn optional_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw.parse().with_context(|| format!("Invalid {}", name)),
        Err(_) => Ok(default),
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_port: parsed_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            redis_url: required("REDIS_URL")?,
            media_config_file: optional_or("MEDIA_CONFIG_FILE", "config/media.yaml"),
            storage_config_file: optional_or("STORAGE_CONFIG_FILE", "config/storages.yaml"),
            jwt_decode_key: required("JWT_DECODE_KEY")?,
            service_api_key: required("SERVICE_API_KEY")?,
            imgproxy_host: required("IMGPROXY_HOST")?,
            imgproxy_key: required("IMGPROXY_KEY")?,
            imgproxy_salt: required("IMGPROXY_SALT")?,
            imgproxy_enlarge: parsed_or("IMGPROXY_RESIZE_ENLARGE", false)?,
            link_expires_secs: parsed_or("LINK_EXPIRES_SECS", DEFAULT_LINK_EXPIRES_SECS)?,
        })
    }
}
