//! Medius DB Library
//!
//! Postgres repositories for the persisted domain entities. Repositories hold
//! a `PgPool` and return clean domain models from `medius-core`.

pub mod media;

pub use media::{BulkAckFilters, MediaRepository};
