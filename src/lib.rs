// Public API for integration tests and potential library usage

pub mod api;
pub mod cards;
pub mod command;
pub mod config;
pub mod deck;
pub mod game;
pub mod player;
pub mod protocol;
pub mod state;
pub mod text;
pub mod types;
pub mod ws;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// HTTP routes: the chat socket and the read-only state endpoint
pub fn router(state: Arc<state::AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/state", get(api::game_state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
