//! Handlers for the event endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/exercises` | Body: `{"category":"balance","source":"library"}` |
//! | `POST` | `/moods` | Body: `{"mood":"good","note":"..."}` |
//!
//! Both accept an optional RFC 3339 `date` for backdated entries; it defaults
//! to now and may not lie in the future. Both return `201` with the
//! [`EventOutcome`].

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use mindful_core::{
  activity::{CompletionSource, ExerciseCategory, Mood, NewCompletion, NewMood},
  engine::{Engine, EventOutcome},
  notify::NotificationScheduler,
  store::ProgressStore,
};
use serde::Deserialize;

use crate::error::ApiError;

fn event_date<S, N>(
  engine: &Engine<S, N>,
  date: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  let now = engine.now();
  match date {
    Some(date) if date > now => {
      Err(ApiError::BadRequest(format!("event date {date} is in the future")))
    }
    Some(date) => Ok(date),
    None => Ok(now),
  }
}

fn created(outcome: EventOutcome) -> impl IntoResponse { (StatusCode::CREATED, Json(outcome)) }

// ─── Exercises ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExerciseBody {
  pub category: ExerciseCategory,
  #[serde(default)]
  pub source:   CompletionSource,
  pub date:     Option<DateTime<Utc>>,
}

/// `POST /exercises`
pub async fn complete_exercise<S, N>(
  State(engine): State<Arc<Engine<S, N>>>,
  Json(body): Json<ExerciseBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  let date = event_date(&engine, body.date)?;
  let outcome = engine
    .complete_exercise(NewCompletion::new(body.category, body.source, date))
    .await?;
  Ok(created(outcome))
}

// ─── Moods ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MoodBody {
  pub mood: Mood,
  pub note: Option<String>,
  pub date: Option<DateTime<Utc>>,
}

/// `POST /moods`. A second check-in on the same day overwrites the first.
pub async fn log_mood<S, N>(
  State(engine): State<Arc<Engine<S, N>>>,
  Json(body): Json<MoodBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  let date = event_date(&engine, body.date)?;
  let mut input = NewMood::new(body.mood, date);
  if let Some(note) = body.note.filter(|n| !n.trim().is_empty()) {
    input = input.with_note(note);
  }
  let outcome = engine.log_mood(input).await?;
  Ok(created(outcome))
}
