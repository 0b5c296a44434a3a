//! Activity records: exercise completions and mood check-ins.
//!
//! Both are keyed by the calendar `day` they happened on, fixed at record time
//! by the engine's [`Calendar`](crate::calendar::Calendar). Completions are
//! append-only; a mood entry is upserted per day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString};
use uuid::Uuid;

// ─── Exercises ───────────────────────────────────────────────────────────────

/// The three exercise families. Completing one of each on the same calendar
/// day makes a perfect day.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExerciseCategory {
  Awareness,
  Balance,
  Reflect,
}

/// Which screen the exercise was started from. Informational only; every
/// source counts the same for streaks and badges.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompletionSource {
  CardView,
  #[default]
  Library,
}

/// One finished exercise session. Never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCompletion {
  pub id:       Uuid,
  pub date:     DateTime<Utc>,
  /// Calendar day of `date` at the time it was recorded.
  pub day:      NaiveDate,
  pub category: ExerciseCategory,
  pub source:   CompletionSource,
}

/// Input to [`crate::engine::Engine::complete_exercise`].
#[derive(Debug, Clone)]
pub struct NewCompletion {
  pub category: ExerciseCategory,
  pub source:   CompletionSource,
  pub date:     DateTime<Utc>,
}

impl NewCompletion {
  pub fn new(
    category: ExerciseCategory,
    source: CompletionSource,
    date: DateTime<Utc>,
  ) -> Self {
    Self { category, source, date }
  }
}

// ─── Moods ───────────────────────────────────────────────────────────────────

/// A self-reported mood, ordered from worst to best.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumCount,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mood {
  Awful,
  Bad,
  Okay,
  Good,
  Great,
}

/// The single active mood check-in for a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
  pub id:   Uuid,
  /// When the entry was last written; moves forward on a same-day upsert.
  pub date: DateTime<Utc>,
  pub day:  NaiveDate,
  pub mood: Mood,
  pub note: Option<String>,
}

impl MoodEntry {
  /// Overwrite this entry with a later same-day check-in. The id is kept.
  pub fn overwrite(&mut self, input: &NewMood) {
    self.date = input.date;
    self.mood = input.mood;
    self.note = input.note.clone();
  }
}

/// Input to [`crate::engine::Engine::log_mood`].
#[derive(Debug, Clone)]
pub struct NewMood {
  pub mood: Mood,
  pub note: Option<String>,
  pub date: DateTime<Utc>,
}

impl NewMood {
  pub fn new(mood: Mood, date: DateTime<Utc>) -> Self {
    Self { mood, note: None, date }
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }
}
