//! Medius API Library
//!
//! HTTP boundary for the media core: handlers, error mapping, and application
//! setup. Auth is intentionally thin here — an HS256 bearer token for user
//! routes and a static service key for internal routes; everything else about
//! identity management lives outside this service.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
