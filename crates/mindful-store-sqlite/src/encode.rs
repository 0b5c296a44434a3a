//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, calendar days are `YYYY-MM-DD`, times of
//! day are `HH:MM`. Enums use their snake_case names. UUIDs are stored as
//! hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mindful_core::{
  activity::{ExerciseCompletion, MoodEntry},
  badge::Badge,
  progress::Progress,
  reminder::ReminderSettings,
};
use uuid::Uuid;

use crate::{Error, Result};

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates and times ─────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_day(day: NaiveDate) -> String { day.format(DAY_FORMAT).to_string() }

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DAY_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_time(time: NaiveTime) -> String { time.format(TIME_FORMAT).to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums and integers ──────────────────────────────────────────────────────

pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::InvalidValue { column, value: s.to_owned() })
}

/// SQLite integers are signed; counters beyond `i64::MAX` are pinned there.
pub fn encode_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

pub fn decode_count<T: TryFrom<i64>>(column: &'static str, n: i64) -> Result<T> {
  T::try_from(n).map_err(|_| Error::InvalidValue { column, value: n.to_string() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from the `progress` row.
pub struct RawProgress {
  pub current_streak:     i64,
  pub current_xp:         i64,
  pub last_exercise_date: Option<String>,
  pub last_mood_check_in: Option<String>,
}

impl RawProgress {
  pub fn into_progress(self) -> Result<Progress> {
    Ok(Progress {
      current_streak:     decode_count("current_streak", self.current_streak)?,
      current_xp:         decode_count("current_xp", self.current_xp)?,
      last_exercise_date: self.last_exercise_date.as_deref().map(decode_day).transpose()?,
      last_mood_check_in: self.last_mood_check_in.as_deref().map(decode_day).transpose()?,
    })
  }
}

/// Raw strings read directly from an `exercise_completions` row.
pub struct RawCompletion {
  pub completion_id: String,
  pub completed_at:  String,
  pub day:           String,
  pub category:      String,
  pub source:        String,
}

impl RawCompletion {
  pub fn into_completion(self) -> Result<ExerciseCompletion> {
    Ok(ExerciseCompletion {
      id:       decode_uuid(&self.completion_id)?,
      date:     decode_dt(&self.completed_at)?,
      day:      decode_day(&self.day)?,
      category: decode_enum("category", &self.category)?,
      source:   decode_enum("source", &self.source)?,
    })
  }
}

/// Raw strings read directly from a `mood_entries` row.
pub struct RawMoodEntry {
  pub entry_id:  String,
  pub logged_at: String,
  pub day:       String,
  pub mood:      String,
  pub note:      Option<String>,
}

impl RawMoodEntry {
  pub fn into_entry(self) -> Result<MoodEntry> {
    Ok(MoodEntry {
      id:   decode_uuid(&self.entry_id)?,
      date: decode_dt(&self.logged_at)?,
      day:  decode_day(&self.day)?,
      mood: decode_enum("mood", &self.mood)?,
      note: self.note,
    })
  }
}

pub struct RawBadge {
  pub badge_id:  String,
  pub progress:  i64,
  pub earned_at: Option<String>,
}

impl RawBadge {
  pub fn into_badge(self) -> Result<Badge> {
    Ok(Badge {
      id:        self.badge_id,
      progress:  decode_count("progress", self.progress)?,
      earned_at: self.earned_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub struct RawReminderSettings {
  pub enabled:              bool,
  pub mindfulness_time:     String,
  pub permission_requested: bool,
  pub permission_granted:   bool,
}

impl RawReminderSettings {
  pub fn into_settings(self) -> Result<ReminderSettings> {
    Ok(ReminderSettings {
      enabled:              self.enabled,
      mindfulness_time:     decode_time(&self.mindfulness_time)?,
      permission_requested: self.permission_requested,
      permission_granted:   self.permission_granted,
    })
  }
}
