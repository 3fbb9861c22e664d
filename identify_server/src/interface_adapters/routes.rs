use crate::interface_adapters::handlers::health::health;
use crate::interface_adapters::handlers::identify::{identify, method_not_allowed};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn app(state: Arc<AppState>) -> Router {
    // Wire the HTTP routes to their handlers.
    Router::new()
        .route("/identify", post(identify).fallback(method_not_allowed))
        .route("/health", get(health))
        .layer(cors_layer())
        .with_state(state)
}

// Browsers call us cross-origin; OPTIONS preflights are answered here with an empty 200.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
