//! Route table.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

pub fn build_router(state: Arc<AppState>) -> Router {
    let user = Router::new()
        .route(
            "/media",
            post(handlers::upload::upload_media).get(handlers::media::list_media),
        )
        .route(
            "/media/{id}",
            get(handlers::media::get_media).delete(handlers::media::delete_media),
        );

    let public = Router::new()
        .route("/media/{id}/original", get(handlers::links::get_original))
        .route("/media/{id}/thumbnail", get(handlers::links::get_thumbnail));

    let internal = Router::new().route("/media/bulk_ack", post(handlers::internal::bulk_ack));

    Router::new()
        .nest(&format!("{API_PREFIX}/user"), user)
        .nest(&format!("{API_PREFIX}/public"), public)
        .nest(&format!("{API_PREFIX}/internal"), internal)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
