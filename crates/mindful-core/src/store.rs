//! The `ProgressStore` trait and the types exchanged with it.
//!
//! The trait is implemented by storage backends (e.g. `mindful-store-sqlite`).
//! The engine depends on this abstraction, never on a concrete backend. Every
//! pipeline run reads one [`Snapshot`] and writes back one [`Commit`].

use std::{future::Future, sync::Mutex};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
  activity::{ExerciseCompletion, MoodEntry},
  badge::Badge,
  progress::Progress,
  reminder::ReminderSettings,
};

// ─── Exchange types ──────────────────────────────────────────────────────────

/// Everything the engine reads for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub progress:    Progress,
  pub completions: Vec<ExerciseCompletion>,
  pub moods:       Vec<MoodEntry>,
  /// Badge instances created so far. Definitions without an instance are
  /// treated as fresh and unearned.
  pub badges:      Vec<Badge>,
}

impl Snapshot {
  pub fn badge(&self, id: &str) -> Option<&Badge> {
    self.badges.iter().find(|b| b.id == id)
  }
}

/// One atomic write-back. Either all of it is persisted or none of it.
#[derive(Debug, Clone, Default)]
pub struct Commit {
  pub progress:   Progress,
  /// A new completion to append.
  pub completion: Option<ExerciseCompletion>,
  /// A mood entry to upsert by `day`.
  pub mood:       Option<MoodEntry>,
  /// Badge instances to get-or-create by id and update.
  pub badges:     Vec<Badge>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the durable store holding the progression state.
///
/// Backends must uphold:
/// - completions are append-only;
/// - at most one mood entry per `day` (a second write overwrites mood, note
///   and date but keeps the original id);
/// - at most one badge instance per id, and a stored `earned_at` is never
///   cleared or replaced;
/// - [`commit`](Self::commit) is atomic and writes are serialized.
pub trait ProgressStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the full progression state.
  fn load_snapshot(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// Completions recorded on calendar day `day`.
  fn completions_on(
    &self,
    day: NaiveDate,
  ) -> impl Future<Output = Result<Vec<ExerciseCompletion>, Self::Error>> + Send + '_;

  /// The mood entry for calendar day `day`, if one was logged.
  fn mood_on(
    &self,
    day: NaiveDate,
  ) -> impl Future<Output = Result<Option<MoodEntry>, Self::Error>> + Send + '_;

  /// Persist one pipeline run's mutations in a single transaction.
  fn commit(
    &self,
    commit: Commit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The persisted reminder configuration, or the default if never saved.
  fn reminder_settings(
    &self,
  ) -> impl Future<Output = Result<ReminderSettings, Self::Error>> + Send + '_;

  fn save_reminder_settings(
    &self,
    settings: ReminderSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  #[error("memory store is unavailable")]
  Unavailable,
}

#[derive(Debug, Default)]
struct MemoryState {
  snapshot:     Snapshot,
  settings:     ReminderSettings,
  fail_commits: bool,
}

/// A [`ProgressStore`] held entirely in memory, following the same rules as a
/// durable backend. Commits can be made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
  state: Mutex<MemoryState>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Start from a prepared snapshot.
  pub fn with_snapshot(snapshot: Snapshot) -> Self {
    Self {
      state: Mutex::new(MemoryState { snapshot, ..MemoryState::default() }),
    }
  }

  /// Make every subsequent [`commit`](ProgressStore::commit) fail.
  pub fn set_fail_commits(&self, fail: bool) {
    self.lock().fail_commits = fail;
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
    // A poisoned lock only means another test thread panicked mid-write.
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl ProgressStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn load_snapshot(&self) -> Result<Snapshot, MemoryStoreError> {
    Ok(self.lock().snapshot.clone())
  }

  async fn completions_on(
    &self,
    day: NaiveDate,
  ) -> Result<Vec<ExerciseCompletion>, MemoryStoreError> {
    Ok(
      self
        .lock()
        .snapshot
        .completions
        .iter()
        .filter(|c| c.day == day)
        .cloned()
        .collect(),
    )
  }

  async fn mood_on(&self, day: NaiveDate) -> Result<Option<MoodEntry>, MemoryStoreError> {
    Ok(self.lock().snapshot.moods.iter().find(|m| m.day == day).cloned())
  }

  async fn commit(&self, commit: Commit) -> Result<(), MemoryStoreError> {
    let mut state = self.lock();
    if state.fail_commits {
      return Err(MemoryStoreError::Unavailable);
    }
    let snapshot = &mut state.snapshot;

    snapshot.progress = commit.progress;
    if let Some(completion) = commit.completion {
      snapshot.completions.push(completion);
    }
    if let Some(entry) = commit.mood {
      match snapshot.moods.iter_mut().find(|m| m.day == entry.day) {
        Some(existing) => {
          existing.date = entry.date;
          existing.mood = entry.mood;
          existing.note = entry.note;
        }
        None => snapshot.moods.push(entry),
      }
    }
    for badge in commit.badges {
      match snapshot.badges.iter_mut().find(|b| b.id == badge.id) {
        Some(existing) => {
          existing.progress = existing.progress.max(badge.progress);
          existing.earned_at = existing.earned_at.or(badge.earned_at);
        }
        None => snapshot.badges.push(badge),
      }
    }
    Ok(())
  }

  async fn reminder_settings(&self) -> Result<ReminderSettings, MemoryStoreError> {
    Ok(self.lock().settings.clone())
  }

  async fn save_reminder_settings(
    &self,
    settings: ReminderSettings,
  ) -> Result<(), MemoryStoreError> {
    self.lock().settings = settings;
    Ok(())
  }
}
