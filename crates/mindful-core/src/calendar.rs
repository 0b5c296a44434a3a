//! Calendar-day arithmetic.
//!
//! Every day boundary in the engine is a year/month/day comparison in one
//! fixed offset, never a 24-hour window. Nothing is cached against the clock:
//! callers derive "today" from a timestamp each time they need it.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset as _, Utc};

use crate::{Error, Result};

/// The fixed timezone used for all calendar-day decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
  offset: FixedOffset,
}

impl Default for Calendar {
  fn default() -> Self { Self::utc() }
}

impl Calendar {
  pub fn utc() -> Self { Self { offset: Utc.fix() } }

  pub fn with_offset(offset: FixedOffset) -> Self { Self { offset } }

  /// Build a calendar from a signed offset east of UTC, in minutes.
  pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
    minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .map(Self::with_offset)
      .ok_or(Error::InvalidUtcOffset(minutes))
  }

  pub fn offset(&self) -> FixedOffset { self.offset }

  /// The calendar day `at` falls on.
  pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&self.offset).date_naive()
  }

  /// The wall-clock time of `at` in this calendar's offset.
  pub fn time_of(&self, at: DateTime<Utc>) -> NaiveTime {
    at.with_timezone(&self.offset).time()
  }

  pub fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    self.day_of(a) == self.day_of(b)
  }
}

/// The day before `day`, saturating at the start of the calendar.
pub fn previous_day(day: NaiveDate) -> NaiveDate { day.pred_opt().unwrap_or(day) }

/// The day after `day`, saturating at the end of the calendar.
pub fn next_day(day: NaiveDate) -> NaiveDate { day.succ_opt().unwrap_or(day) }

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of "now" for the engine. Tests pin it; production reads the system
/// clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
  #[default]
  System,
  Fixed(DateTime<Utc>),
}

impl Clock {
  pub fn now(&self) -> DateTime<Utc> {
    match self {
      Self::System => Utc::now(),
      Self::Fixed(at) => *at,
    }
  }
}
