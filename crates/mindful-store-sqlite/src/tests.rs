//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone as _, Utc};
use mindful_core::{
  activity::{CompletionSource, ExerciseCategory, ExerciseCompletion, Mood, MoodEntry},
  badge::Badge,
  progress::Progress,
  reminder::ReminderSettings,
  store::{Commit, ProgressStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, d).unwrap() }

fn completion(d: u32, category: ExerciseCategory) -> ExerciseCompletion {
  ExerciseCompletion {
    id: Uuid::new_v4(),
    date: at(d, 8),
    day: day(d),
    category,
    source: CompletionSource::CardView,
  }
}

fn mood(d: u32, hour: u32, mood: Mood, note: Option<&str>) -> MoodEntry {
  MoodEntry {
    id: Uuid::new_v4(),
    date: at(d, hour),
    day: day(d),
    mood,
    note: note.map(str::to_owned),
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_has_empty_snapshot() {
  let s = store().await;
  let snapshot = s.load_snapshot().await.unwrap();

  assert_eq!(snapshot.progress, Progress::default());
  assert!(snapshot.completions.is_empty());
  assert!(snapshot.moods.is_empty());
  assert!(snapshot.badges.is_empty());
}

#[tokio::test]
async fn commit_round_trips_progress_and_completion() {
  let s = store().await;
  let done = completion(10, ExerciseCategory::Awareness);

  s.commit(Commit {
    progress: Progress {
      current_streak:     4,
      current_xp:         130,
      last_exercise_date: Some(day(10)),
      last_mood_check_in: Some(day(9)),
    },
    completion: Some(done.clone()),
    ..Commit::default()
  })
  .await
  .unwrap();

  let snapshot = s.load_snapshot().await.unwrap();
  assert_eq!(snapshot.progress.current_streak, 4);
  assert_eq!(snapshot.progress.current_xp, 130);
  assert_eq!(snapshot.progress.last_exercise_date, Some(day(10)));
  assert_eq!(snapshot.progress.last_mood_check_in, Some(day(9)));
  assert_eq!(snapshot.completions, vec![done]);
}

#[tokio::test]
async fn completions_are_appended_in_time_order() {
  let s = store().await;
  for (d, category) in [
    (12, ExerciseCategory::Reflect),
    (10, ExerciseCategory::Awareness),
    (11, ExerciseCategory::Balance),
  ] {
    s.commit(Commit { completion: Some(completion(d, category)), ..Commit::default() })
      .await
      .unwrap();
  }

  let snapshot = s.load_snapshot().await.unwrap();
  let days: Vec<_> = snapshot.completions.iter().map(|c| c.day).collect();
  assert_eq!(days, vec![day(10), day(11), day(12)]);
}

// ─── Moods ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn same_day_mood_overwrites_and_keeps_id() {
  let s = store().await;
  let first = mood(10, 8, Mood::Bad, None);
  s.commit(Commit { mood: Some(first.clone()), ..Commit::default() }).await.unwrap();

  // A later write for the same day carries a different id; the row keeps the
  // original one.
  let second = mood(10, 20, Mood::Great, Some("better by evening"));
  s.commit(Commit { mood: Some(second.clone()), ..Commit::default() }).await.unwrap();

  let moods = s.load_snapshot().await.unwrap().moods;
  assert_eq!(moods.len(), 1);
  assert_eq!(moods[0].id, first.id);
  assert_eq!(moods[0].mood, Mood::Great);
  assert_eq!(moods[0].date, second.date);
  assert_eq!(moods[0].note.as_deref(), Some("better by evening"));
}

#[tokio::test]
async fn per_day_queries_only_see_that_day() {
  let s = store().await;
  for (d, category) in [
    (10, ExerciseCategory::Awareness),
    (11, ExerciseCategory::Balance),
    (11, ExerciseCategory::Reflect),
  ] {
    s.commit(Commit { completion: Some(completion(d, category)), ..Commit::default() })
      .await
      .unwrap();
  }
  s.commit(Commit { mood: Some(mood(11, 9, Mood::Good, None)), ..Commit::default() })
    .await
    .unwrap();

  let on_11 = s.completions_on(day(11)).await.unwrap();
  assert_eq!(on_11.len(), 2);
  assert!(on_11.iter().all(|c| c.day == day(11)));
  assert!(s.completions_on(day(12)).await.unwrap().is_empty());

  assert_eq!(s.mood_on(day(11)).await.unwrap().map(|m| m.mood), Some(Mood::Good));
  assert!(s.mood_on(day(10)).await.unwrap().is_none());
}

#[tokio::test]
async fn moods_on_different_days_are_separate_rows() {
  let s = store().await;
  for d in [10, 11] {
    s.commit(Commit { mood: Some(mood(d, 9, Mood::Okay, None)), ..Commit::default() })
      .await
      .unwrap();
  }
  assert_eq!(s.load_snapshot().await.unwrap().moods.len(), 2);
}

// ─── Badges ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn badge_upsert_never_lowers_progress_or_clears_earned_at() {
  let s = store().await;
  let earned = Badge { id: "streak_3".into(), progress: 3, earned_at: Some(at(10, 9)) };
  s.commit(Commit { badges: vec![earned.clone()], ..Commit::default() }).await.unwrap();

  let stale = Badge { id: "streak_3".into(), progress: 1, earned_at: None };
  s.commit(Commit { badges: vec![stale], ..Commit::default() }).await.unwrap();

  let later = Badge { id: "streak_3".into(), progress: 3, earned_at: Some(at(20, 9)) };
  s.commit(Commit { badges: vec![later], ..Commit::default() }).await.unwrap();

  let badges = s.load_snapshot().await.unwrap().badges;
  assert_eq!(badges, vec![earned]);
}

#[tokio::test]
async fn badge_progress_accumulates() {
  let s = store().await;
  for progress in [2, 5] {
    s.commit(Commit {
      badges: vec![Badge { id: "balance_10".into(), progress, earned_at: None }],
      ..Commit::default()
    })
    .await
    .unwrap();
  }

  let snapshot = s.load_snapshot().await.unwrap();
  let badge = snapshot.badge("balance_10").unwrap();
  assert_eq!(badge.progress, 5);
  assert!(!badge.is_earned());
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_commit_writes_nothing() {
  let s = store().await;
  let done = completion(10, ExerciseCategory::Balance);
  s.commit(Commit {
    progress: Progress { current_xp: 10, ..Progress::default() },
    completion: Some(done.clone()),
    ..Commit::default()
  })
  .await
  .unwrap();

  // Re-inserting the same completion id violates the primary key after the
  // progress row was already updated inside the transaction.
  let result = s
    .commit(Commit {
      progress: Progress { current_xp: 999, ..Progress::default() },
      completion: Some(done),
      badges: vec![Badge { id: "xp_100".into(), progress: 100, earned_at: Some(at(10, 9)) }],
      ..Commit::default()
    })
    .await;
  assert!(result.is_err());

  let snapshot = s.load_snapshot().await.unwrap();
  assert_eq!(snapshot.progress.current_xp, 10);
  assert_eq!(snapshot.completions.len(), 1);
  assert!(snapshot.badges.is_empty());
}

// ─── Reminder settings ───────────────────────────────────────────────────────

#[tokio::test]
async fn reminder_settings_default_until_saved() {
  let s = store().await;
  assert_eq!(s.reminder_settings().await.unwrap(), ReminderSettings::default());

  let settings = ReminderSettings {
    enabled:              true,
    mindfulness_time:     NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
    permission_requested: true,
    permission_granted:   true,
  };
  s.save_reminder_settings(settings.clone()).await.unwrap();
  assert_eq!(s.reminder_settings().await.unwrap(), settings);
}

#[tokio::test]
async fn reopening_a_file_keeps_state() {
  let path = std::env::temp_dir().join(format!("mindful-{}.sqlite", Uuid::new_v4()));

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.commit(Commit {
      progress: Progress { current_streak: 2, ..Progress::default() },
      ..Commit::default()
    })
    .await
    .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.load_snapshot().await.unwrap().progress.current_streak, 2);
  let _ = std::fs::remove_file(&path);
}
