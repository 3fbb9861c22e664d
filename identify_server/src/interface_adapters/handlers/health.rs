use crate::interface_adapters::protocol::HealthResponse;
use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

// Liveness of the relay itself; never touches the upstream.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        upstream: state.settings.target.name.clone(),
    })
}
