mod handlers;
mod state;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info};

use crate::pair::PairProcessor;

pub fn build_router(processor: PairProcessor) -> Router {
    let state = Arc::new(AppState { processor });

    Router::new()
        .route("/api/pair", get(handlers::pair))
        .route("/api/zone", get(handlers::zone_only))
        .route("/api/pairs", post(handlers::batch))
        .route("/api/metro-ranges", get(handlers::metro_ranges))
        .route("/api/special-states", get(handlers::special_states))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, processor: PairProcessor) -> std::io::Result<()> {
    let app = build_router(processor);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!("Cannot bind to {}: {}", addr, e);
        e
    })?;

    info!("Pinzone server listening on http://{}", addr);
    info!("Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
