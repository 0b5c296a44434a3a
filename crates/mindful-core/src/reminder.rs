//! Reminder coordination.
//!
//! Three channels, each with a stable notification id:
//!
//! | Channel | Id | Trigger |
//! |---|---|---|
//! | Mindfulness | `daily_mindfulness_reminder` | daily at the configured time |
//! | Mood | `daily_mood_reminder` | daily, 15 minutes after mindfulness |
//! | Streak warning | `daily_streak_warning` | once, 22:00 the day after an exercise |
//!
//! A daily reminder is only live for a day on which its habit is still
//! undone: the first exercise (or mood check-in) of a day re-arms the channel
//! starting tomorrow. Scheduling is best-effort; failures are logged and
//! never reach the caller.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _};
use tokio::sync::Mutex;

use crate::{
  calendar::next_day,
  notify::{NotificationScheduler, PendingNotification, Trigger},
};

pub const MINDFULNESS_REMINDER_ID: &str = "daily_mindfulness_reminder";
pub const MOOD_REMINDER_ID: &str = "daily_mood_reminder";
pub const STREAK_WARNING_ID: &str = "daily_streak_warning";

/// Minutes between the mindfulness and mood reminders.
pub const MOOD_REMINDER_OFFSET_MINUTES: i64 = 15;

const STREAK_WARNING_HOUR: u32 = 22;

/// 22:00, the streak-in-danger warning time.
pub fn streak_warning_time() -> NaiveTime {
  NaiveTime::from_hms_opt(STREAK_WARNING_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// The mood reminder time for a given mindfulness time, wrapping at midnight.
pub fn mood_reminder_time(mindfulness: NaiveTime) -> NaiveTime {
  let (time, _wrapped) = mindfulness
    .overflowing_add_signed(Duration::minutes(MOOD_REMINDER_OFFSET_MINUTES));
  time
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// Persisted reminder configuration, including the permission flags that
/// keep the user from being prompted twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
  pub enabled:              bool,
  pub mindfulness_time:     NaiveTime,
  #[serde(default)]
  pub permission_requested: bool,
  #[serde(default)]
  pub permission_granted:   bool,
}

impl Default for ReminderSettings {
  fn default() -> Self {
    Self {
      enabled:              false,
      mindfulness_time:     NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
      permission_requested: false,
      permission_granted:   false,
    }
  }
}

impl ReminderSettings {
  /// Reminders are on and the platform allows them.
  pub fn is_active(&self) -> bool { self.enabled && self.permission_granted }

  pub fn mood_time(&self) -> NaiveTime { mood_reminder_time(self.mindfulness_time) }
}

/// Drop seconds and below; reminder times are kept to the minute.
pub fn whole_minute(time: NaiveTime) -> NaiveTime {
  NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

// ─── Day status ──────────────────────────────────────────────────────────────

/// Where the user stands today, as seen when reminders are restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStatus {
  pub today:              NaiveDate,
  /// Local wall-clock time.
  pub time:               NaiveTime,
  pub exercised_today:    bool,
  pub mood_logged_today:  bool,
  pub last_exercise_date: Option<NaiveDate>,
}

impl DayStatus {
  /// The day a streak warning is still due for, if any: the day after the
  /// last exercise, provided that is tomorrow, or today before 22:00.
  pub fn streak_warning_date(&self) -> Option<NaiveDate> {
    let last = self.last_exercise_date?;
    let due = next_day(last);
    let pending = due > self.today || (due == self.today && self.time < streak_warning_time());
    pending.then_some(due)
  }
}

// ─── Channels ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderChannel {
  Mindfulness,
  Mood,
  StreakWarning,
}

impl ReminderChannel {
  pub fn id(&self) -> &'static str {
    match self {
      Self::Mindfulness => MINDFULNESS_REMINDER_ID,
      Self::Mood => MOOD_REMINDER_ID,
      Self::StreakWarning => STREAK_WARNING_ID,
    }
  }
}

/// What the coordinator last asked the scheduler to hold for a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChannelState {
  #[default]
  Unarmed,
  Armed(Trigger),
}

#[derive(Debug, Default)]
struct Channels {
  mindfulness:    Mutex<ChannelState>,
  mood:           Mutex<ChannelState>,
  streak_warning: Mutex<ChannelState>,
}

impl Channels {
  fn get(&self, channel: ReminderChannel) -> &Mutex<ChannelState> {
    match channel {
      ReminderChannel::Mindfulness => &self.mindfulness,
      ReminderChannel::Mood => &self.mood,
      ReminderChannel::StreakWarning => &self.streak_warning,
    }
  }
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

/// Decides which reminders to cancel and arm in response to events.
///
/// Cancel-then-arm on one channel runs under that channel's lock, so a stale
/// arm can never land after a newer cancel. Different channels proceed
/// independently.
pub struct ReminderCoordinator<N> {
  scheduler: N,
  channels:  Channels,
}

impl<N: NotificationScheduler> ReminderCoordinator<N> {
  pub fn new(scheduler: N) -> Self {
    Self { scheduler, channels: Channels::default() }
  }

  pub fn scheduler(&self) -> &N { &self.scheduler }

  pub async fn state(&self, channel: ReminderChannel) -> ChannelState {
    *self.channels.get(channel).lock().await
  }

  /// Every channel with its current state, in a fixed order.
  pub async fn states(&self) -> Vec<(ReminderChannel, ChannelState)> {
    let mut states = Vec::new();
    for channel in ReminderChannel::iter() {
      states.push((channel, self.state(channel).await));
    }
    states
  }

  /// Apply a settings change and return the settings with the permission
  /// flags updated. Authorization is confirmed whenever reminders are
  /// enabled; the platform only prompts the user the first time.
  pub async fn configure(&self, settings: ReminderSettings) -> ReminderSettings {
    let mut settings = settings;

    if settings.enabled {
      let first_request = !settings.permission_requested;
      settings.permission_granted = self.scheduler.request_authorization().await;
      settings.permission_requested = true;
      if first_request {
        tracing::info!(granted = settings.permission_granted, "notification permission requested");
      }
    }

    self.disarm(ReminderChannel::Mindfulness).await;
    self.disarm(ReminderChannel::Mood).await;

    if !settings.enabled {
      self.disarm(ReminderChannel::StreakWarning).await;
      return settings;
    }
    if !settings.permission_granted {
      tracing::warn!("reminders enabled but notification permission is not granted");
      return settings;
    }

    self
      .arm(
        ReminderChannel::Mindfulness,
        Trigger::Daily { time: settings.mindfulness_time, from: None },
      )
      .await;
    self
      .arm(ReminderChannel::Mood, Trigger::Daily { time: settings.mood_time(), from: None })
      .await;
    settings
  }

  /// React to an exercise completion on `today`. Only the first completion
  /// of the day changes anything.
  pub async fn on_exercise_completed(
    &self,
    settings: &ReminderSettings,
    today: NaiveDate,
    first_of_day: bool,
  ) {
    if !first_of_day {
      tracing::debug!(%today, "exercise reminders already settled for today");
      return;
    }
    if !settings.is_active() {
      return;
    }

    let tomorrow = next_day(today);
    self
      .rearm(
        ReminderChannel::Mindfulness,
        Trigger::Daily { time: settings.mindfulness_time, from: Some(tomorrow) },
      )
      .await;
    self
      .rearm(
        ReminderChannel::StreakWarning,
        Trigger::Once { date: tomorrow, time: streak_warning_time() },
      )
      .await;
  }

  /// React to a mood check-in on `today`. Only the first check-in of the day
  /// changes anything.
  pub async fn on_mood_logged(
    &self,
    settings: &ReminderSettings,
    today: NaiveDate,
    first_of_day: bool,
  ) {
    if !first_of_day {
      tracing::debug!(%today, "mood reminder already settled for today");
      return;
    }
    if !settings.is_active() {
      return;
    }

    self
      .rearm(
        ReminderChannel::Mood,
        Trigger::Daily { time: settings.mood_time(), from: Some(next_day(today)) },
      )
      .await;
  }

  /// Re-arm every channel after a restart or a day rollover. Daily channels
  /// start today or tomorrow depending on whether their habit is done; the
  /// streak warning is put back for the day after the last exercise, unless
  /// that warning has already gone off.
  pub async fn restore(&self, settings: &ReminderSettings, day: &DayStatus) {
    if !settings.is_active() {
      return;
    }
    if !self.scheduler.request_authorization().await {
      tracing::warn!("notification permission was revoked; reminders not restored");
      return;
    }

    let start = |done: bool| if done { next_day(day.today) } else { day.today };
    self
      .rearm(
        ReminderChannel::Mindfulness,
        Trigger::Daily {
          time: settings.mindfulness_time,
          from: Some(start(day.exercised_today)),
        },
      )
      .await;
    self
      .rearm(
        ReminderChannel::Mood,
        Trigger::Daily { time: settings.mood_time(), from: Some(start(day.mood_logged_today)) },
      )
      .await;

    match day.streak_warning_date() {
      Some(date) => {
        self
          .rearm(
            ReminderChannel::StreakWarning,
            Trigger::Once { date, time: streak_warning_time() },
          )
          .await;
      }
      None => self.disarm(ReminderChannel::StreakWarning).await,
    }
  }

  pub async fn pending(&self) -> Vec<PendingNotification> {
    self.scheduler.list_pending().await
  }

  // ── Channel primitives ──────────────────────────────────────────────────

  async fn disarm(&self, channel: ReminderChannel) {
    let mut state = self.channels.get(channel).lock().await;
    self.scheduler.cancel(&[channel.id()]).await;
    *state = ChannelState::Unarmed;
  }

  /// Arm without cancelling first; the channel is known to be unarmed.
  async fn arm(&self, channel: ReminderChannel, trigger: Trigger) {
    let mut state = self.channels.get(channel).lock().await;
    if self.submit(channel, trigger).await {
      *state = ChannelState::Armed(trigger);
    }
  }

  /// Cancel then arm under the channel lock. If arming fails, the previous
  /// trigger is put back so the channel keeps its prior state.
  async fn rearm(&self, channel: ReminderChannel, trigger: Trigger) {
    let mut state = self.channels.get(channel).lock().await;
    let previous = *state;

    self.scheduler.cancel(&[channel.id()]).await;
    if self.submit(channel, trigger).await {
      *state = ChannelState::Armed(trigger);
      return;
    }

    if let ChannelState::Armed(old) = previous {
      if self.submit(channel, old).await {
        return;
      }
    }
    *state = ChannelState::Unarmed;
  }

  async fn submit(&self, channel: ReminderChannel, trigger: Trigger) -> bool {
    let id = channel.id();
    let result = match trigger {
      Trigger::Daily { time, from } => {
        self.scheduler.schedule_recurring_daily(id, time, from).await
      }
      Trigger::Once { date, time } => self.scheduler.schedule_one_shot(id, date, time).await,
    };

    match result {
      Ok(()) => {
        tracing::debug!(id, ?trigger, "reminder armed");
        true
      }
      Err(err) => {
        tracing::warn!(id, error = %err, "failed to schedule reminder");
        false
      }
    }
  }
}
