//! HTTP server assembly for the mindful progression engine.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite store
//! and serves [`app`].

pub mod settings;

use std::sync::Arc;

use axum::Router;
use mindful_core::{engine::Engine, notify::NotificationScheduler, store::ProgressStore};
use tower_http::trace::TraceLayer;

pub use settings::{ServerConfig, expand_tilde};

/// The full application router: the JSON API under `/api`, traced.
pub fn app<S, N>(engine: Arc<Engine<S, N>>) -> Router
where
  S: ProgressStore + 'static,
  N: NotificationScheduler + 'static,
{
  Router::new()
    .nest("/api", mindful_api::api_router(engine))
    .layer(TraceLayer::new_for_http())
}
