//! Read-only HTTP endpoints for dashboards.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::game::GameSnapshot;
use crate::state::AppState;

/// Current game state.
///
/// GET /api/state
pub async fn game_state(State(state): State<Arc<AppState>>) -> Json<GameSnapshot> {
    Json(state.snapshot().await)
}
