//! [`SqliteStore`]: the SQLite implementation of [`ProgressStore`].

use std::path::Path;

use chrono::NaiveDate;
use mindful_core::{
  activity::{ExerciseCompletion, MoodEntry},
  reminder::ReminderSettings,
  store::{Commit, ProgressStore, Snapshot},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    RawBadge, RawCompletion, RawMoodEntry, RawProgress, RawReminderSettings, encode_count,
    encode_day, encode_dt, encode_time, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A progression store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// share one connection thread, so writes are serialized.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema ready");
    Ok(())
  }
}

// ─── Encoded commit ──────────────────────────────────────────────────────────

/// A [`Commit`] with every value already in column form, so it can move onto
/// the connection thread.
struct EncodedCommit {
  streak:             i64,
  xp:                 i64,
  last_exercise_date: Option<String>,
  last_mood_check_in: Option<String>,
  completion:         Option<[String; 5]>,
  mood:               Option<(String, String, String, String, Option<String>)>,
  badges:             Vec<(String, i64, Option<String>)>,
}

impl From<Commit> for EncodedCommit {
  fn from(commit: Commit) -> Self {
    let progress = commit.progress;
    Self {
      streak:             i64::from(progress.current_streak),
      xp:                 encode_count(progress.current_xp),
      last_exercise_date: progress.last_exercise_date.map(encode_day),
      last_mood_check_in: progress.last_mood_check_in.map(encode_day),
      completion:         commit.completion.map(|c| {
        [
          encode_uuid(c.id),
          encode_dt(c.date),
          encode_day(c.day),
          c.category.as_ref().to_owned(),
          c.source.as_ref().to_owned(),
        ]
      }),
      mood:               commit.mood.map(|m| {
        (
          encode_uuid(m.id),
          encode_dt(m.date),
          encode_day(m.day),
          m.mood.as_ref().to_owned(),
          m.note,
        )
      }),
      badges:             commit
        .badges
        .into_iter()
        .map(|b| (b.id, encode_count(b.progress), b.earned_at.map(encode_dt)))
        .collect(),
    }
  }
}

// ─── ProgressStore impl ──────────────────────────────────────────────────────

impl ProgressStore for SqliteStore {
  type Error = crate::Error;

  async fn load_snapshot(&self) -> Result<Snapshot> {
    let (progress, completions, moods, badges) = self
      .conn
      .call(|conn| {
        let progress = conn.query_row(
          "SELECT current_streak, current_xp, last_exercise_date, last_mood_check_in
           FROM progress WHERE id = 1",
          [],
          |r| {
            Ok(RawProgress {
              current_streak:     r.get(0)?,
              current_xp:         r.get(1)?,
              last_exercise_date: r.get(2)?,
              last_mood_check_in: r.get(3)?,
            })
          },
        )?;

        let completions = conn
          .prepare(
            "SELECT completion_id, completed_at, day, category, source
             FROM exercise_completions ORDER BY completed_at",
          )?
          .query_map([], |r| {
            Ok(RawCompletion {
              completion_id: r.get(0)?,
              completed_at:  r.get(1)?,
              day:           r.get(2)?,
              category:      r.get(3)?,
              source:        r.get(4)?,
            })
          })?
          .collect::<Result<Vec<_>, _>>()?;

        let moods = conn
          .prepare(
            "SELECT entry_id, logged_at, day, mood, note FROM mood_entries ORDER BY day",
          )?
          .query_map([], |r| {
            Ok(RawMoodEntry {
              entry_id:  r.get(0)?,
              logged_at: r.get(1)?,
              day:       r.get(2)?,
              mood:      r.get(3)?,
              note:      r.get(4)?,
            })
          })?
          .collect::<Result<Vec<_>, _>>()?;

        let badges = conn
          .prepare("SELECT badge_id, progress, earned_at FROM badges ORDER BY badge_id")?
          .query_map([], |r| {
            Ok(RawBadge { badge_id: r.get(0)?, progress: r.get(1)?, earned_at: r.get(2)? })
          })?
          .collect::<Result<Vec<_>, _>>()?;

        Ok((progress, completions, moods, badges))
      })
      .await?;

    Ok(Snapshot {
      progress:    progress.into_progress()?,
      completions: completions
        .into_iter()
        .map(RawCompletion::into_completion)
        .collect::<Result<_>>()?,
      moods:       moods.into_iter().map(RawMoodEntry::into_entry).collect::<Result<_>>()?,
      badges:      badges.into_iter().map(RawBadge::into_badge).collect::<Result<_>>()?,
    })
  }

  async fn completions_on(&self, day: NaiveDate) -> Result<Vec<ExerciseCompletion>> {
    let day_str = encode_day(day);

    let raws = self
      .conn
      .call(move |conn| {
        let raws = conn
          .prepare(
            "SELECT completion_id, completed_at, day, category, source
             FROM exercise_completions WHERE day = ?1 ORDER BY completed_at",
          )?
          .query_map(rusqlite::params![day_str], |r| {
            Ok(RawCompletion {
              completion_id: r.get(0)?,
              completed_at:  r.get(1)?,
              day:           r.get(2)?,
              category:      r.get(3)?,
              source:        r.get(4)?,
            })
          })?
          .collect::<Result<Vec<_>, _>>()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawCompletion::into_completion).collect()
  }

  async fn mood_on(&self, day: NaiveDate) -> Result<Option<MoodEntry>> {
    let day_str = encode_day(day);

    let raw = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT entry_id, logged_at, day, mood, note FROM mood_entries WHERE day = ?1",
            rusqlite::params![day_str],
            |r| {
              Ok(RawMoodEntry {
                entry_id:  r.get(0)?,
                logged_at: r.get(1)?,
                day:       r.get(2)?,
                mood:      r.get(3)?,
                note:      r.get(4)?,
              })
            },
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawMoodEntry::into_entry).transpose()
  }

  async fn commit(&self, commit: Commit) -> Result<()> {
    let encoded = EncodedCommit::from(commit);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "UPDATE progress
           SET current_streak = ?1, current_xp = ?2,
               last_exercise_date = ?3, last_mood_check_in = ?4
           WHERE id = 1",
          rusqlite::params![
            encoded.streak,
            encoded.xp,
            encoded.last_exercise_date,
            encoded.last_mood_check_in,
          ],
        )?;

        if let Some([id, at, day, category, source]) = &encoded.completion {
          tx.execute(
            "INSERT INTO exercise_completions
               (completion_id, completed_at, day, category, source)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, at, day, category, source],
          )?;
        }

        // Same-day check-ins overwrite the row in place, keeping entry_id.
        if let Some((id, at, day, mood, note)) = &encoded.mood {
          tx.execute(
            "INSERT INTO mood_entries (entry_id, logged_at, day, mood, note)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(day) DO UPDATE SET
               logged_at = excluded.logged_at,
               mood      = excluded.mood,
               note      = excluded.note",
            rusqlite::params![id, at, day, mood, note],
          )?;
        }

        // Progress never goes down and a stored earned_at is never replaced.
        for (id, progress, earned_at) in &encoded.badges {
          tx.execute(
            "INSERT INTO badges (badge_id, progress, earned_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(badge_id) DO UPDATE SET
               progress  = MAX(badges.progress, excluded.progress),
               earned_at = COALESCE(badges.earned_at, excluded.earned_at)",
            rusqlite::params![id, progress, earned_at],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn reminder_settings(&self) -> Result<ReminderSettings> {
    let raw = self
      .conn
      .call(|conn| {
        let raw = conn.query_row(
          "SELECT enabled, mindfulness_time, permission_requested, permission_granted
           FROM reminder_settings WHERE id = 1",
          [],
          |r| {
            Ok(RawReminderSettings {
              enabled:              r.get(0)?,
              mindfulness_time:     r.get(1)?,
              permission_requested: r.get(2)?,
              permission_granted:   r.get(3)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;
    raw.into_settings()
  }

  async fn save_reminder_settings(&self, settings: ReminderSettings) -> Result<()> {
    let time = encode_time(settings.mindfulness_time);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE reminder_settings
           SET enabled = ?1, mindfulness_time = ?2,
               permission_requested = ?3, permission_granted = ?4
           WHERE id = 1",
          rusqlite::params![
            settings.enabled,
            time,
            settings.permission_requested,
            settings.permission_granted,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
