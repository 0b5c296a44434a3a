//! Streak continuity: contiguous-day walks over the activity history.
//!
//! All comparisons use the calendar `day` stored on each record. A streak is
//! a run of consecutive days; the walk stops at the first missing day.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use strum::{EnumCount as _, IntoEnumIterator as _};

use crate::{
  activity::{ExerciseCategory, ExerciseCompletion, Mood, MoodEntry},
  calendar::previous_day,
  progress::Progress,
};

// ─── Exercise streak ─────────────────────────────────────────────────────────

/// Whether a completion on `today` should advance the streak: true iff none of
/// `completions` (recorded before this event) falls on `today`.
///
/// This is what makes the streak advance at most once per calendar day, no
/// matter how many exercises are finished or from which screen.
pub fn should_increment_on_completion(
  today: NaiveDate,
  completions: &[ExerciseCompletion],
) -> bool {
  !completions.iter().any(|c| c.day == today)
}

/// The stored streak as seen from `today`: zero once a whole day has passed
/// without an exercise, otherwise unchanged.
pub fn reconcile_streak(progress: &Progress, today: NaiveDate) -> u32 {
  match progress.last_exercise_date {
    Some(last) if last < previous_day(today) => 0,
    _ => progress.current_streak,
  }
}

/// Apply a completion on `day` to `progress`. `completions` is the history
/// before this event. Returns `true` if the streak advanced.
///
/// Completions dated before the last exercise day are history backfill and
/// never move the streak.
pub fn record_exercise(
  progress: &mut Progress,
  day: NaiveDate,
  completions: &[ExerciseCompletion],
) -> bool {
  if progress.last_exercise_date.is_some_and(|last| day < last) {
    return false;
  }

  progress.current_streak = reconcile_streak(progress, day);
  let advance = should_increment_on_completion(day, completions);
  if advance {
    progress.current_streak = progress.current_streak.saturating_add(1);
  }
  progress.last_exercise_date = Some(day);
  advance
}

/// Length of the exercise streak derived purely from history: the run of
/// consecutive days ending today, or ending yesterday if today has nothing
/// yet.
pub fn exercise_streak_length(
  completions: &[ExerciseCompletion],
  today: NaiveDate,
) -> u32 {
  let days: BTreeSet<NaiveDate> = completions.iter().map(|c| c.day).collect();
  let start = if days.contains(&today) { today } else { previous_day(today) };
  walk_back(days.into_iter().rev(), start)
}

// ─── Mood streak ─────────────────────────────────────────────────────────────

/// Length of the mood check-in run ending exactly on `today`. Zero if today
/// has no entry. Entries dated after `today` are ignored.
pub fn mood_streak_length(moods: &[MoodEntry], today: NaiveDate) -> u32 {
  let mut days: Vec<NaiveDate> = moods.iter().map(|m| m.day).collect();
  days.sort_unstable_by(|a, b| b.cmp(a));
  days.dedup();
  walk_back(days.into_iter(), today)
}

/// Count of distinct moods ever logged, at most the number of moods.
pub fn unique_mood_count(moods: &[MoodEntry]) -> u32 {
  let distinct: BTreeSet<Mood> = moods.iter().map(|m| m.mood).collect();
  distinct.len().min(Mood::COUNT) as u32
}

// ─── Category facts ──────────────────────────────────────────────────────────

/// True iff every exercise category has at least one completion on `day`.
pub fn has_perfect_day(completions: &[ExerciseCompletion], day: NaiveDate) -> bool {
  let done: BTreeSet<ExerciseCategory> = completions
    .iter()
    .filter(|c| c.day == day)
    .map(|c| c.category)
    .collect();
  ExerciseCategory::iter().all(|category| done.contains(&category))
}

/// All-time completion count for one category.
pub fn category_count(
  completions: &[ExerciseCompletion],
  category: ExerciseCategory,
) -> u64 {
  completions.iter().filter(|c| c.category == category).count() as u64
}

/// Walk `days` (distinct, newest first) backwards from `start`, counting
/// consecutive matches.
fn walk_back(days: impl Iterator<Item = NaiveDate>, start: NaiveDate) -> u32 {
  let mut expected = start;
  let mut length = 0u32;
  for day in days {
    if day > expected {
      continue;
    }
    if day != expected {
      break;
    }
    length += 1;
    match expected.pred_opt() {
      Some(prev) => expected = prev,
      None => break,
    }
  }
  length
}
