//! JSON REST API for the mindful progression engine.
//!
//! Exposes an axum [`Router`] over a shared [`Engine`]. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mindful_api::api_router(engine.clone()))
//! ```

pub mod badges;
pub mod error;
pub mod events;
pub mod progress;
pub mod reminders;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use mindful_core::{engine::Engine, notify::NotificationScheduler, store::ProgressStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(engine: Arc<Engine<S, N>>) -> Router<()>
where
  S: ProgressStore + 'static,
  N: NotificationScheduler + 'static,
{
  Router::new()
    .route("/progress", get(progress::show::<S, N>))
    // Events
    .route("/exercises", post(events::complete_exercise::<S, N>))
    .route("/moods", post(events::log_mood::<S, N>))
    // Badges
    .route("/badges", get(badges::list::<S, N>))
    .route("/badges/evaluate", post(badges::evaluate::<S, N>))
    // Reminders
    .route("/reminders", get(reminders::show::<S, N>).put(reminders::update::<S, N>))
    .with_state(engine)
}
