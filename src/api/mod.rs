use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod requests;
pub mod responses;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/telemetry", post(handlers::post_telemetry))
        .route("/bins", get(handlers::get_bins))
        .route("/bins/register", post(handlers::register_bin))
        .route(
            "/bins/{bin_id}",
            get(handlers::get_bin).delete(handlers::delete_bin),
        )
        .route("/bins/{bin_id}/emptied", post(handlers::mark_emptied))
        .route("/heatmap", get(handlers::get_heatmap))
        .route("/route", get(handlers::get_route))
        // the map frontend is served from a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
