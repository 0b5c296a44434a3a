//! Badge definitions, requirements and per-user badge instances.
//!
//! A [`BadgeDefinition`] is immutable catalog data. A [`Badge`] is the user's
//! record for one definition: it accumulates `progress` and transitions from
//! unearned to earned exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::activity::ExerciseCategory;

// ─── Classification ──────────────────────────────────────────────────────────

/// Grouping used by the catalog filters and the per-category evaluation pass.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BadgeCategory {
  Streak,
  Xp,
  Category,
  Mood,
  Achievement,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Rarity {
  Common,
  Rare,
  Epic,
  Legendary,
}

// ─── Requirement ─────────────────────────────────────────────────────────────

/// What a badge asks of the user. Evaluation is an exhaustive match over this
/// enum, so adding a kind forces every consumer to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
  /// Exercise streak of at least `days`.
  Streak { days: u32 },
  /// Lifetime XP of at least `amount`.
  TotalXp { amount: u64 },
  /// At least `count` completions in `category`, all time, any source.
  CategoryCount { category: ExerciseCategory, count: u32 },
  /// Mood check-ins on `days` consecutive days ending today.
  MoodStreak { days: u32 },
  /// At least `distinct` different moods logged, all time.
  MoodVariety { distinct: u32 },
  /// All three exercise categories completed on the same calendar day.
  PerfectDay,
}

impl Requirement {
  /// The progress value at which the requirement is met. `PerfectDay` is
  /// binary, so its target is 1.
  pub fn target(&self) -> u64 {
    match *self {
      Self::Streak { days } | Self::MoodStreak { days } => u64::from(days),
      Self::TotalXp { amount } => amount,
      Self::CategoryCount { count, .. } => u64::from(count),
      Self::MoodVariety { distinct } => u64::from(distinct),
      Self::PerfectDay => 1,
    }
  }

  /// Whether the underlying metric can never go down. Streaks can reset, a
  /// perfect day only holds for one day, and mood variety shrinks when a
  /// same-day check-in overwrites the only entry with some mood.
  pub fn is_monotone(&self) -> bool {
    matches!(self, Self::TotalXp { .. } | Self::CategoryCount { .. })
  }
}

// ─── Definition ──────────────────────────────────────────────────────────────

/// A catalog entry. Ids are stable across releases; never reuse one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
  pub id:          &'static str,
  pub name:        &'static str,
  pub description: &'static str,
  pub category:    BadgeCategory,
  pub requirement: Requirement,
  pub rarity:      Rarity,
}

// ─── Instance ────────────────────────────────────────────────────────────────

/// The user's record for one [`BadgeDefinition`], matched by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
  pub id:        String,
  /// Non-decreasing while unearned; frozen once earned.
  pub progress:  u64,
  /// Set exactly once, never cleared.
  pub earned_at: Option<DateTime<Utc>>,
}

impl Badge {
  /// A fresh, unearned instance for `id`.
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into(), progress: 0, earned_at: None }
  }

  pub fn is_earned(&self) -> bool { self.earned_at.is_some() }
}

/// A definition joined with the user's instance, the read model served to
/// callers listing badges.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeStatus {
  pub definition: BadgeDefinition,
  pub badge:      Badge,
}
