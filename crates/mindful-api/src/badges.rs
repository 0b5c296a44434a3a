//! Handlers for `/badges` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/badges` | Optional `?category=streak\|xp\|category\|mood\|achievement` |
//! | `POST` | `/badges/evaluate` | Same filter; returns the newly earned definitions |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use mindful_core::{
  badge::{BadgeCategory, BadgeDefinition, BadgeStatus},
  engine::Engine,
  notify::NotificationScheduler,
  store::ProgressStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CategoryParams {
  pub category: Option<BadgeCategory>,
}

/// `GET /badges[?category=<category>]`
pub async fn list<S, N>(
  State(engine): State<Arc<Engine<S, N>>>,
  Query(params): Query<CategoryParams>,
) -> Result<Json<Vec<BadgeStatus>>, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  Ok(Json(engine.badges(params.category).await?))
}

/// `POST /badges/evaluate[?category=<category>]`
pub async fn evaluate<S, N>(
  State(engine): State<Arc<Engine<S, N>>>,
  Query(params): Query<CategoryParams>,
) -> Result<Json<Vec<BadgeDefinition>>, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  Ok(Json(engine.evaluate_badges(params.category).await?))
}
