//! Handlers for `/reminders`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reminders` | Settings, channel states and pending notifications |
//! | `PUT`  | `/reminders` | Body: `{"enabled":true,"mindfulness_time":"08:30:00"}` |

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::NaiveTime;
use mindful_core::{
  engine::Engine,
  notify::{NotificationScheduler, PendingNotification},
  reminder::{ChannelState, ReminderChannel, ReminderSettings},
  store::ProgressStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ReminderView {
  pub settings: ReminderSettings,
  pub channels: Vec<ChannelView>,
  pub pending:  Vec<PendingNotification>,
}

#[derive(Debug, Serialize)]
pub struct ChannelView {
  pub channel: ReminderChannel,
  pub id:      &'static str,
  pub state:   ChannelState,
}

/// `GET /reminders`
pub async fn show<S, N>(
  State(engine): State<Arc<Engine<S, N>>>,
) -> Result<Json<ReminderView>, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  let settings = engine.reminder_settings().await?;
  let channels = engine
    .reminder_states()
    .await
    .into_iter()
    .map(|(channel, state)| ChannelView { channel, id: channel.id(), state })
    .collect();
  let pending = engine.pending_reminders().await;
  Ok(Json(ReminderView { settings, channels, pending }))
}

/// The user-editable part of [`ReminderSettings`]. Permission flags are
/// owned by the engine; seconds in `mindfulness_time` are dropped.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub enabled:          bool,
  pub mindfulness_time: NaiveTime,
}

/// `PUT /reminders`
pub async fn update<S, N>(
  State(engine): State<Arc<Engine<S, N>>>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<ReminderSettings>, ApiError>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  let settings = ReminderSettings {
    enabled: body.enabled,
    mindfulness_time: body.mindfulness_time,
    ..ReminderSettings::default()
  };
  Ok(Json(engine.configure_reminders(settings).await?))
}
