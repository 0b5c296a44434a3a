//! User progression: the streak and XP counters the engine advances.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The mutable progression facts for the (single) user profile.
///
/// Only the streak tracker writes `current_streak` and `last_exercise_date`;
/// only XP awards write `current_xp`, which never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
  pub current_streak:     u32,
  pub current_xp:         u64,
  pub last_exercise_date: Option<NaiveDate>,
  pub last_mood_check_in: Option<NaiveDate>,
}

impl Progress {
  /// Add `amount` XP, saturating. Returns the new total.
  pub fn award_xp(&mut self, amount: u64) -> u64 {
    self.current_xp = self.current_xp.saturating_add(amount);
    self.current_xp
  }

  /// Record a mood check-in on `day`. Never moves the marker backwards.
  pub fn check_in_mood(&mut self, day: NaiveDate) {
    if self.last_mood_check_in.is_none_or(|last| last < day) {
      self.last_mood_check_in = Some(day);
    }
  }
}
