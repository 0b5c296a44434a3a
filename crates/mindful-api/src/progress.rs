//! Handler for `GET /progress`.

use std::sync::Arc;

use axum::{Json, extract::State};
use mindful_core::{
  engine::Engine, notify::NotificationScheduler, progress::Progress, store::ProgressStore,
};

use crate::error::ApiError;

/// `GET /progress`: streak and XP as of now. A streak broken by a missed
/// day reads as 0.
pub async fn show<S, N>(
  State(engine): State<Arc<Engine<S, N>>>,
) -> Result<Json<Progress>, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  Ok(Json(engine.progress().await?))
}
