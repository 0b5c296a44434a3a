//! The `NotificationScheduler` trait, the boundary to OS notification
//! delivery, and an in-process implementation of it.

use std::{
  collections::{BTreeMap, VecDeque},
  future::Future,
  sync::Mutex,
};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Types ───────────────────────────────────────────────────────────────────

/// When a pending notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
  /// Every day at `time`. With `from` set, the first occurrence is on that
  /// day; otherwise the next time `time` comes round.
  Daily {
    time: NaiveTime,
    from: Option<NaiveDate>,
  },
  /// Once, on `date` at `time`.
  Once { date: NaiveDate, time: NaiveTime },
}

impl Trigger {
  pub fn repeats(&self) -> bool { matches!(self, Self::Daily { .. }) }
}

/// A request the scheduler is holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
  pub id:      String,
  pub trigger: Trigger,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulingError {
  #[error("notification permission denied")]
  PermissionDenied,

  #[error("scheduling rejected: {0}")]
  Rejected(String),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the platform's local-notification service.
///
/// Scheduling under an id that is already pending replaces it. Cancelling an
/// id that is not pending is a no-op.
pub trait NotificationScheduler: Send + Sync {
  /// Ask the user for permission. Returns whether it was granted.
  fn request_authorization(&self) -> impl Future<Output = bool> + Send + '_;

  fn schedule_recurring_daily<'a>(
    &'a self,
    id: &'a str,
    time: NaiveTime,
    from: Option<NaiveDate>,
  ) -> impl Future<Output = Result<(), SchedulingError>> + Send + 'a;

  fn schedule_one_shot<'a>(
    &'a self,
    id: &'a str,
    date: NaiveDate,
    time: NaiveTime,
  ) -> impl Future<Output = Result<(), SchedulingError>> + Send + 'a;

  fn cancel<'a>(&'a self, ids: &'a [&'a str]) -> impl Future<Output = ()> + Send + 'a;

  /// Everything currently pending. Diagnostics only.
  fn list_pending(
    &self,
  ) -> impl Future<Output = Vec<PendingNotification>> + Send + '_;
}

// ─── In-memory scheduler ─────────────────────────────────────────────────────

/// One call received by a [`MemoryScheduler`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
  Cancel(Vec<String>),
  Schedule(PendingNotification),
}

/// How many recent calls a [`MemoryScheduler`] remembers.
pub const CALL_LOG_LIMIT: usize = 256;

#[derive(Debug)]
struct SchedulerState {
  grant:      bool,
  authorized: bool,
  failing:    bool,
  pending:    BTreeMap<String, Trigger>,
  calls:      VecDeque<SchedulerCall>,
}

impl SchedulerState {
  fn record(&mut self, call: SchedulerCall) {
    if self.calls.len() == CALL_LOG_LIMIT {
      self.calls.pop_front();
    }
    self.calls.push_back(call);
  }
}

/// A scheduler that keeps pending notifications in process memory.
///
/// The server uses it as its delivery backend (reminders are re-armed on
/// start-up); tests use its call log and failure switch.
#[derive(Debug)]
pub struct MemoryScheduler {
  state: Mutex<SchedulerState>,
}

impl Default for MemoryScheduler {
  fn default() -> Self { Self::new() }
}

impl MemoryScheduler {
  /// A scheduler whose permission prompt is answered with "allow".
  pub fn new() -> Self { Self::with_grant(true) }

  /// A scheduler whose permission prompt is answered with `grant`.
  pub fn with_grant(grant: bool) -> Self {
    Self {
      state: Mutex::new(SchedulerState {
        grant,
        authorized: false,
        failing: false,
        pending: BTreeMap::new(),
        calls: VecDeque::with_capacity(CALL_LOG_LIMIT),
      }),
    }
  }

  /// Make every scheduling request fail until switched back.
  pub fn set_failing(&self, failing: bool) { self.lock().failing = failing; }

  /// The most recent calls, oldest first, up to [`CALL_LOG_LIMIT`].
  pub fn calls(&self) -> Vec<SchedulerCall> { self.lock().calls.iter().cloned().collect() }

  pub fn pending_trigger(&self, id: &str) -> Option<Trigger> {
    self.lock().pending.get(id).copied()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn schedule(&self, id: &str, trigger: Trigger) -> Result<(), SchedulingError> {
    let mut state = self.lock();
    if !state.authorized {
      return Err(SchedulingError::PermissionDenied);
    }
    if state.failing {
      return Err(SchedulingError::Rejected(format!("{id}: scheduler unavailable")));
    }
    state.pending.insert(id.to_owned(), trigger);
    state.record(SchedulerCall::Schedule(PendingNotification { id: id.to_owned(), trigger }));
    Ok(())
  }
}

impl NotificationScheduler for MemoryScheduler {
  async fn request_authorization(&self) -> bool {
    let mut state = self.lock();
    state.authorized = state.grant;
    state.authorized
  }

  async fn schedule_recurring_daily<'a>(
    &'a self,
    id: &'a str,
    time: NaiveTime,
    from: Option<NaiveDate>,
  ) -> Result<(), SchedulingError> {
    self.schedule(id, Trigger::Daily { time, from })
  }

  async fn schedule_one_shot<'a>(
    &'a self,
    id: &'a str,
    date: NaiveDate,
    time: NaiveTime,
  ) -> Result<(), SchedulingError> {
    self.schedule(id, Trigger::Once { date, time })
  }

  async fn cancel<'a>(&'a self, ids: &'a [&'a str]) {
    let mut state = self.lock();
    for id in ids {
      state.pending.remove(*id);
    }
    state.record(SchedulerCall::Cancel(ids.iter().map(|id| (*id).to_owned()).collect()));
  }

  async fn list_pending(&self) -> Vec<PendingNotification> {
    self
      .lock()
      .pending
      .iter()
      .map(|(id, trigger)| PendingNotification { id: id.clone(), trigger: *trigger })
      .collect()
  }
}
