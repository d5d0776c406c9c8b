//! Medius Core Library
//!
//! This crate provides the domain models and error types shared across all
//! Medius components.

pub mod error;
pub mod models;

// Re-export commonly used types
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Media, MediaType, NewMedia};
