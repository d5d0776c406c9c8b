//! Identity at the interface boundary.
//!
//! User routes take an HS256 bearer token whose `sub` claim is the owner id;
//! internal routes take a static service key header. Token issuing, refresh,
//! and key rotation are external concerns.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use jsonwebtoken::{decode, Algorithm, Validation};
use medius_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

pub const SERVICE_KEY_HEADER: &str = "x-service-key";

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid,
    pub exp: i64,
}

/// The authenticated owner of user-scoped requests.
#[derive(Debug, Clone, Copy)]
pub struct OwnerIdentity {
    pub owner_id: Uuid,
}

impl FromRequestParts<Arc<AppState>> for OwnerIdentity {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthorized("Missing bearer token".to_string())
            })?;

        let data = decode::<JwtClaims>(
            token,
            &state.jwt_decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            AppError::Unauthorized("Invalid bearer token".to_string())
        })?;

        Ok(OwnerIdentity {
            owner_id: data.claims.sub,
        })
    }
}

/// Marker extractor for internal (service-to-service) routes.
#[derive(Debug, Clone, Copy)]
pub struct ServiceIdentity;

impl FromRequestParts<Arc<AppState>> for ServiceIdentity {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(SERVICE_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match presented {
            Some(key) if key == state.service_api_key => Ok(ServiceIdentity),
            _ => Err(AppError::Unauthorized("Invalid service key".to_string()).into()),
        }
    }
}
