//! The per-event pipeline.
//!
//! An [`Engine`] is built once per session with its collaborators injected.
//! Each event runs the same fixed sequence:
//!
//! 1. load a fresh [`Snapshot`] from the store;
//! 2. streak tracker (reset on a missed day, then at most one increment);
//! 3. XP award;
//! 4. achievement evaluation against the engine's own clock;
//! 5. one atomic [`Commit`];
//! 6. reminder coordination.
//!
//! Runs are serialized: each one loads after the previous one committed.
//! If the commit fails nothing is persisted and no reminder is touched.
//! Reminder failures never fail the event.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
  Error, Result,
  activity::{ExerciseCompletion, MoodEntry, NewCompletion, NewMood},
  badge::{Badge, BadgeCategory, BadgeDefinition, BadgeStatus},
  calendar::{Calendar, Clock},
  catalog::Catalog,
  evaluator::{Evaluation, Evaluator},
  notify::{NotificationScheduler, PendingNotification},
  progress::Progress,
  reminder::{
    ChannelState, DayStatus, ReminderChannel, ReminderCoordinator, ReminderSettings,
    whole_minute,
  },
  store::{Commit, ProgressStore, Snapshot},
  streak,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// XP granted per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpRules {
  /// Every finished exercise session.
  pub per_exercise: u64,
  /// The first mood check-in of a day. Same-day overwrites earn nothing.
  pub per_mood:     u64,
}

impl Default for XpRules {
  fn default() -> Self { Self { per_exercise: 10, per_mood: 5 } }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
  pub calendar: Calendar,
  pub clock:    Clock,
  pub xp:       XpRules,
  pub catalog:  Catalog,
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What an event did, for the caller to display.
#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
  pub day:                NaiveDate,
  pub streak_incremented: bool,
  pub current_streak:     u32,
  pub xp_awarded:         u64,
  pub current_xp:         u64,
  pub newly_earned:       Vec<BadgeDefinition>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine<S, N> {
  store:       S,
  coordinator: ReminderCoordinator<N>,
  config:      EngineConfig,
  /// Held for the whole of every read-modify-commit run.
  pipeline:    Mutex<()>,
}

impl<S, N> Engine<S, N>
where
  S: ProgressStore,
  N: NotificationScheduler,
{
  pub fn new(store: S, scheduler: N, config: EngineConfig) -> Self {
    Self {
      store,
      coordinator: ReminderCoordinator::new(scheduler),
      config,
      pipeline: Mutex::new(()),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn scheduler(&self) -> &N { self.coordinator.scheduler() }

  pub fn catalog(&self) -> &Catalog { &self.config.catalog }

  pub fn calendar(&self) -> &Calendar { &self.config.calendar }

  pub fn now(&self) -> DateTime<Utc> { self.config.clock.now() }

  pub fn today(&self) -> NaiveDate { self.config.calendar.day_of(self.now()) }

  // ── Events ──────────────────────────────────────────────────────────────

  /// Record a finished exercise and run the pipeline.
  ///
  /// A completion dated yesterday still counts towards the streak; badges are
  /// always judged as of now.
  pub async fn complete_exercise(&self, input: NewCompletion) -> Result<EventOutcome> {
    let _run = self.pipeline.lock().await;
    let now = self.now();
    let today = self.config.calendar.day_of(now);
    let day = self.config.calendar.day_of(input.date);
    let mut snapshot = self.store.load_snapshot().await.map_err(Error::storage)?;

    let incremented =
      streak::record_exercise(&mut snapshot.progress, day, &snapshot.completions);
    snapshot.progress.current_streak = streak::reconcile_streak(&snapshot.progress, today);
    let completion = ExerciseCompletion {
      id: Uuid::new_v4(),
      date: input.date,
      day,
      category: input.category,
      source: input.source,
    };
    snapshot.completions.push(completion.clone());

    let xp_awarded = self.config.xp.per_exercise;
    snapshot.progress.award_xp(xp_awarded);

    let evaluation = self.evaluator().evaluate(&mut snapshot, now, today);
    self
      .commit(Commit {
        progress:   snapshot.progress.clone(),
        completion: Some(completion),
        mood:       None,
        badges:     evaluation.changed.clone(),
      })
      .await?;

    tracing::info!(
      %day,
      category = %input.category,
      streak = snapshot.progress.current_streak,
      incremented,
      "exercise completed"
    );

    if day == today {
      let settings = self.settings_for_reminders().await;
      self.coordinator.on_exercise_completed(&settings, day, incremented).await;
    }

    Ok(self.outcome(day, incremented, xp_awarded, &snapshot.progress, &evaluation))
  }

  /// Record a mood check-in (upserting the day's entry) and run the pipeline.
  pub async fn log_mood(&self, input: NewMood) -> Result<EventOutcome> {
    let _run = self.pipeline.lock().await;
    let now = self.now();
    let today = self.config.calendar.day_of(now);
    let day = self.config.calendar.day_of(input.date);
    let mut snapshot = self.load(today).await?;

    let first_of_day = !snapshot.moods.iter().any(|m| m.day == day);
    let entry = match snapshot.moods.iter_mut().find(|m| m.day == day) {
      Some(existing) => {
        existing.overwrite(&input);
        existing.clone()
      }
      None => {
        let entry = MoodEntry {
          id: Uuid::new_v4(),
          date: input.date,
          day,
          mood: input.mood,
          note: input.note.clone(),
        };
        snapshot.moods.push(entry.clone());
        entry
      }
    };

    snapshot.progress.check_in_mood(day);
    let xp_awarded = if first_of_day { self.config.xp.per_mood } else { 0 };
    snapshot.progress.award_xp(xp_awarded);

    let evaluation = self.evaluator().evaluate(&mut snapshot, now, today);
    self
      .commit(Commit {
        progress:   snapshot.progress.clone(),
        completion: None,
        mood:       Some(entry),
        badges:     evaluation.changed.clone(),
      })
      .await?;

    tracing::info!(%day, mood = %input.mood, first_of_day, "mood logged");

    if day == today {
      let settings = self.settings_for_reminders().await;
      self.coordinator.on_mood_logged(&settings, day, first_of_day).await;
    }

    Ok(self.outcome(day, false, xp_awarded, &snapshot.progress, &evaluation))
  }

  /// Re-evaluate badges without a new event, optionally restricted to one
  /// category. Writes only when something changed.
  pub async fn evaluate_badges(
    &self,
    category: Option<BadgeCategory>,
  ) -> Result<Vec<BadgeDefinition>> {
    let _run = self.pipeline.lock().await;
    let now = self.now();
    let today = self.config.calendar.day_of(now);
    let mut snapshot = self.load(today).await?;

    let evaluator = self.evaluator();
    let evaluation = match category {
      Some(category) => evaluator.evaluate_category(category, &mut snapshot, now, today),
      None => evaluator.evaluate(&mut snapshot, now, today),
    };

    if evaluation.is_dirty() {
      self
        .commit(Commit {
          progress: snapshot.progress.clone(),
          badges: evaluation.changed.clone(),
          ..Commit::default()
        })
        .await?;
    }
    Ok(self.definitions(&evaluation))
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// The progression as of now: a streak broken by a missed day reads as 0.
  pub async fn progress(&self) -> Result<Progress> {
    Ok(self.load(self.today()).await?.progress)
  }

  /// Every catalog badge with the user's instance (fresh if never touched).
  pub async fn badges(&self, category: Option<BadgeCategory>) -> Result<Vec<BadgeStatus>> {
    let snapshot = self.load(self.today()).await?;
    Ok(
      self
        .config
        .catalog
        .definitions()
        .iter()
        .filter(|d| category.is_none_or(|c| d.category == c))
        .map(|definition| BadgeStatus {
          definition: definition.clone(),
          badge:      snapshot
            .badge(definition.id)
            .cloned()
            .unwrap_or_else(|| Badge::new(definition.id)),
        })
        .collect(),
    )
  }

  // ── Reminders ───────────────────────────────────────────────────────────

  pub async fn reminder_settings(&self) -> Result<ReminderSettings> {
    self.store.reminder_settings().await.map_err(Error::storage)
  }

  /// Apply and persist a reminder configuration change. The reminder time
  /// is kept to the minute.
  pub async fn configure_reminders(
    &self,
    settings: ReminderSettings,
  ) -> Result<ReminderSettings> {
    let _run = self.pipeline.lock().await;
    let previous = self.reminder_settings().await?;
    let settings = ReminderSettings {
      mindfulness_time: whole_minute(settings.mindfulness_time),
      permission_requested: previous.permission_requested,
      permission_granted: previous.permission_granted,
      ..settings
    };

    let applied = self.coordinator.configure(settings).await;
    self
      .store
      .save_reminder_settings(applied.clone())
      .await
      .map_err(Error::storage)?;
    Ok(applied)
  }

  /// Bring every reminder in line with today's activity, including a
  /// streak warning still due. Called at start-up and after a day rollover.
  pub async fn restore_reminders(&self) -> Result<()> {
    let _run = self.pipeline.lock().await;
    let settings = self.reminder_settings().await?;
    let now = self.now();
    let today = self.config.calendar.day_of(now);

    let progress = self.store.load_snapshot().await.map_err(Error::storage)?.progress;
    let exercised_today =
      !self.store.completions_on(today).await.map_err(Error::storage)?.is_empty();
    let mood_logged_today =
      self.store.mood_on(today).await.map_err(Error::storage)?.is_some();

    let day = DayStatus {
      today,
      time: self.config.calendar.time_of(now),
      exercised_today,
      mood_logged_today,
      last_exercise_date: progress.last_exercise_date,
    };
    self.coordinator.restore(&settings, &day).await;
    Ok(())
  }

  pub async fn pending_reminders(&self) -> Vec<PendingNotification> {
    self.coordinator.pending().await
  }

  pub async fn reminder_states(&self) -> Vec<(ReminderChannel, ChannelState)> {
    self.coordinator.states().await
  }

  // ── Internals ───────────────────────────────────────────────────────────

  fn evaluator(&self) -> Evaluator<'_> { Evaluator::new(&self.config.catalog) }

  /// Load a snapshot with the streak reconciled against `today`.
  async fn load(&self, today: NaiveDate) -> Result<Snapshot> {
    let mut snapshot = self.store.load_snapshot().await.map_err(Error::storage)?;
    snapshot.progress.current_streak = streak::reconcile_streak(&snapshot.progress, today);
    Ok(snapshot)
  }

  async fn commit(&self, commit: Commit) -> Result<()> {
    self.store.commit(commit).await.map_err(|err| {
      tracing::warn!(error = %err, "progress commit failed; run discarded");
      Error::storage(err)
    })
  }

  /// Reminder settings for event handling. A read failure disables reminder
  /// handling for this event only.
  async fn settings_for_reminders(&self) -> ReminderSettings {
    match self.store.reminder_settings().await {
      Ok(settings) => settings,
      Err(err) => {
        tracing::warn!(error = %err, "could not read reminder settings");
        ReminderSettings::default()
      }
    }
  }

  fn definitions(&self, evaluation: &Evaluation) -> Vec<BadgeDefinition> {
    evaluation
      .newly_earned
      .iter()
      .filter_map(|id| self.config.catalog.by_id(id).cloned())
      .collect()
  }

  fn outcome(
    &self,
    day: NaiveDate,
    streak_incremented: bool,
    xp_awarded: u64,
    progress: &Progress,
    evaluation: &Evaluation,
  ) -> EventOutcome {
    EventOutcome {
      day,
      streak_incremented,
      current_streak: progress.current_streak,
      xp_awarded,
      current_xp: progress.current_xp,
      newly_earned: self.definitions(evaluation),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use chrono::{NaiveTime, TimeZone as _};

  use super::*;
  use crate::{
    activity::{CompletionSource, ExerciseCategory, Mood},
    notify::{MemoryScheduler, SchedulerCall, Trigger},
    reminder::{MOOD_REMINDER_ID, STREAK_WARNING_ID},
    store::MemoryStore,
  };

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap() }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 10).unwrap() }

  fn days_ago(n: u64) -> NaiveDate { today() - chrono::Days::new(n) }

  fn engine(snapshot: Snapshot) -> Engine<MemoryStore, MemoryScheduler> {
    Engine::new(
      MemoryStore::with_snapshot(snapshot),
      MemoryScheduler::new(),
      EngineConfig { clock: Clock::Fixed(now()), ..EngineConfig::default() },
    )
  }

  fn streak_of(days: u32) -> Snapshot {
    Snapshot {
      progress: Progress {
        current_streak: days,
        last_exercise_date: Some(days_ago(1)),
        ..Progress::default()
      },
      ..Snapshot::default()
    }
  }

  fn completion_on(day: NaiveDate, category: ExerciseCategory) -> ExerciseCompletion {
    ExerciseCompletion {
      id: Uuid::new_v4(),
      date: day.and_hms_opt(8, 0, 0).unwrap().and_utc(),
      day,
      category,
      source: CompletionSource::Library,
    }
  }

  fn exercise(category: ExerciseCategory) -> NewCompletion {
    NewCompletion::new(category, CompletionSource::Library, now())
  }

  fn earned_ids(outcome: &EventOutcome) -> Vec<&'static str> {
    outcome.newly_earned.iter().map(|d| d.id).collect()
  }

  async fn enable_reminders(engine: &Engine<MemoryStore, MemoryScheduler>) {
    engine
      .configure_reminders(ReminderSettings { enabled: true, ..ReminderSettings::default() })
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn first_completion_of_the_day_extends_the_streak_once() {
    let engine = engine(streak_of(2));

    let first = engine.complete_exercise(exercise(ExerciseCategory::Awareness)).await.unwrap();
    assert!(first.streak_incremented);
    assert_eq!(first.current_streak, 3);
    assert_eq!(earned_ids(&first), vec!["streak_3"]);

    let second = engine.complete_exercise(exercise(ExerciseCategory::Balance)).await.unwrap();
    assert!(!second.streak_incremented);
    assert_eq!(second.current_streak, 3);
    assert!(second.newly_earned.is_empty());

    let progress = engine.progress().await.unwrap();
    assert_eq!(progress.current_streak, 3);
    assert_eq!(progress.current_xp, 20);
    assert_eq!(progress.last_exercise_date, Some(today()));
  }

  #[tokio::test]
  async fn earned_badge_is_stamped_and_not_reported_again() {
    let engine = engine(streak_of(2));
    engine.complete_exercise(exercise(ExerciseCategory::Awareness)).await.unwrap();

    let statuses = engine.badges(Some(BadgeCategory::Streak)).await.unwrap();
    let streak_3 = statuses.iter().find(|s| s.definition.id == "streak_3").unwrap();
    assert_eq!(streak_3.badge.earned_at, Some(now()));
    assert_eq!(streak_3.badge.progress, 3);

    assert!(engine.evaluate_badges(None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn tenth_balance_session_earns_balance_10_only() {
    let completions =
      (1..=9).map(|n| completion_on(days_ago(n), ExerciseCategory::Balance)).collect();
    let engine = engine(Snapshot { completions, ..Snapshot::default() });

    let outcome = engine.complete_exercise(exercise(ExerciseCategory::Balance)).await.unwrap();
    assert!(earned_ids(&outcome).contains(&"balance_10"));

    let statuses = engine.badges(Some(BadgeCategory::Category)).await.unwrap();
    let balance_25 = statuses.iter().find(|s| s.definition.id == "balance_25").unwrap();
    assert!(!balance_25.badge.is_earned());
    assert_eq!(balance_25.badge.progress, 10);
  }

  #[tokio::test]
  async fn mood_check_in_rearms_the_mood_reminder_from_tomorrow() {
    let engine = engine(Snapshot::default());
    enable_reminders(&engine).await;

    engine.log_mood(NewMood::new(Mood::Good, now())).await.unwrap();

    let calls = engine.scheduler().calls();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(tail[0], SchedulerCall::Cancel(vec![MOOD_REMINDER_ID.to_owned()]));
    let expected = Trigger::Daily {
      time: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
      from: Some(today() + chrono::Days::new(1)),
    };
    assert_eq!(
      tail[1],
      SchedulerCall::Schedule(PendingNotification {
        id:      MOOD_REMINDER_ID.to_owned(),
        trigger: expected,
      })
    );
    assert!(
      engine.pending_reminders().await.iter().any(|p| p.id == MOOD_REMINDER_ID)
    );
  }

  #[tokio::test]
  async fn same_day_mood_overwrites_and_awards_xp_once() {
    let engine = engine(Snapshot::default());

    let first = engine.log_mood(NewMood::new(Mood::Okay, now())).await.unwrap();
    let second = engine
      .log_mood(NewMood::new(Mood::Great, now()).with_note("walked outside"))
      .await
      .unwrap();
    assert_eq!(first.xp_awarded, 5);
    assert_eq!(second.xp_awarded, 0);
    assert_eq!(second.current_xp, 5);

    let snapshot = engine.store().load_snapshot().await.unwrap();
    assert_eq!(snapshot.moods.len(), 1);
    assert_eq!(snapshot.moods[0].mood, Mood::Great);
    assert_eq!(snapshot.moods[0].note.as_deref(), Some("walked outside"));
    assert_eq!(snapshot.progress.last_mood_check_in, Some(today()));
  }

  #[tokio::test]
  async fn missed_day_resets_the_streak() {
    let engine = engine(Snapshot {
      progress: Progress {
        current_streak: 5,
        last_exercise_date: Some(days_ago(3)),
        ..Progress::default()
      },
      ..Snapshot::default()
    });

    assert_eq!(engine.progress().await.unwrap().current_streak, 0);

    let outcome = engine.complete_exercise(exercise(ExerciseCategory::Reflect)).await.unwrap();
    assert!(outcome.streak_incremented);
    assert_eq!(outcome.current_streak, 1);
  }

  #[tokio::test]
  async fn backdated_completion_leaves_streak_and_reminders_alone() {
    let engine = engine(streak_of(4));
    enable_reminders(&engine).await;
    let calls_before = engine.scheduler().calls().len();

    let backdated = NewCompletion::new(
      ExerciseCategory::Awareness,
      CompletionSource::CardView,
      now() - chrono::Duration::days(5),
    );
    let outcome = engine.complete_exercise(backdated).await.unwrap();

    assert!(!outcome.streak_incremented);
    assert_eq!(outcome.current_streak, 4);
    assert_eq!(outcome.xp_awarded, 10);
    assert_eq!(engine.scheduler().calls().len(), calls_before);
  }

  #[tokio::test]
  async fn failed_commit_persists_nothing_and_touches_no_reminder() {
    let engine = engine(streak_of(2));
    enable_reminders(&engine).await;
    let calls_before = engine.scheduler().calls().len();
    engine.store().set_fail_commits(true);

    let result = engine.complete_exercise(exercise(ExerciseCategory::Awareness)).await;
    assert!(matches!(result, Err(Error::Storage(_))));

    let snapshot = engine.store().load_snapshot().await.unwrap();
    assert!(snapshot.completions.is_empty());
    assert!(snapshot.badges.is_empty());
    assert_eq!(snapshot.progress.current_xp, 0);
    assert_eq!(engine.scheduler().calls().len(), calls_before);
  }

  #[tokio::test]
  async fn scheduler_failure_does_not_fail_the_event() {
    let engine = engine(streak_of(2));
    enable_reminders(&engine).await;
    engine.scheduler().set_failing(true);

    let outcome = engine.complete_exercise(exercise(ExerciseCategory::Awareness)).await.unwrap();
    assert!(outcome.streak_incremented);
    assert_eq!(engine.store().load_snapshot().await.unwrap().completions.len(), 1);
  }

  #[tokio::test]
  async fn first_exercise_arms_tomorrows_streak_warning() {
    let engine = engine(streak_of(1));
    enable_reminders(&engine).await;

    engine.complete_exercise(exercise(ExerciseCategory::Balance)).await.unwrap();

    assert_eq!(
      engine.scheduler().pending_trigger(STREAK_WARNING_ID),
      Some(Trigger::Once {
        date: today() + chrono::Days::new(1),
        time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
      })
    );
  }

  #[tokio::test]
  async fn configure_keeps_the_recorded_permission() {
    let engine = Engine::new(
      MemoryStore::new(),
      MemoryScheduler::with_grant(false),
      EngineConfig { clock: Clock::Fixed(now()), ..EngineConfig::default() },
    );

    let applied = engine
      .configure_reminders(ReminderSettings { enabled: true, ..ReminderSettings::default() })
      .await
      .unwrap();
    assert!(applied.permission_requested);
    assert!(!applied.permission_granted);
    assert_eq!(engine.reminder_settings().await.unwrap(), applied);
    assert!(engine.pending_reminders().await.is_empty());
  }

  #[tokio::test]
  async fn restore_starts_finished_habits_tomorrow() {
    let engine = engine(Snapshot {
      completions: vec![completion_on(today(), ExerciseCategory::Awareness)],
      ..Snapshot::default()
    });
    enable_reminders(&engine).await;

    engine.restore_reminders().await.unwrap();

    let states = engine.reminder_states().await;
    let state_of = |channel| states.iter().find(|(c, _)| *c == channel).map(|(_, s)| *s);
    assert_eq!(
      state_of(ReminderChannel::Mindfulness),
      Some(ChannelState::Armed(Trigger::Daily {
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        from: Some(today() + chrono::Days::new(1)),
      }))
    );
    assert_eq!(
      state_of(ReminderChannel::Mood),
      Some(ChannelState::Armed(Trigger::Daily {
        time: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
        from: Some(today()),
      }))
    );
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_completions_keep_every_award() {
    let engine = Arc::new(engine(Snapshot::default()));

    let runs: Vec<_> = (0..10)
      .map(|_| {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
          engine.complete_exercise(exercise(ExerciseCategory::Awareness)).await
        })
      })
      .collect();
    let mut increments = 0;
    for run in runs {
      if run.await.unwrap().unwrap().streak_incremented {
        increments += 1;
      }
    }

    let snapshot = engine.store().load_snapshot().await.unwrap();
    assert_eq!(snapshot.completions.len(), 10);
    assert_eq!(snapshot.progress.current_xp, 100);
    assert_eq!(snapshot.progress.current_streak, 1);
    assert_eq!(increments, 1);
  }

  #[tokio::test]
  async fn completion_for_yesterday_extends_a_live_streak() {
    let engine = engine(Snapshot {
      progress: Progress {
        current_streak: 5,
        last_exercise_date: Some(days_ago(2)),
        ..Progress::default()
      },
      ..Snapshot::default()
    });

    let yesterday = NewCompletion::new(
      ExerciseCategory::Balance,
      CompletionSource::Library,
      now() - chrono::Duration::days(1),
    );
    let late = engine.complete_exercise(yesterday).await.unwrap();
    assert!(late.streak_incremented);
    assert_eq!(late.current_streak, 6);

    let on_time = engine.complete_exercise(exercise(ExerciseCategory::Reflect)).await.unwrap();
    assert_eq!(on_time.current_streak, 7);
    assert_eq!(engine.progress().await.unwrap().last_exercise_date, Some(today()));
  }

  #[tokio::test]
  async fn backdated_event_stamps_badges_with_the_current_time() {
    let engine = engine(Snapshot {
      progress: Progress { current_xp: 95, ..Progress::default() },
      ..Snapshot::default()
    });

    let backdated = NewCompletion::new(
      ExerciseCategory::Awareness,
      CompletionSource::Library,
      now() - chrono::Duration::days(5),
    );
    let outcome = engine.complete_exercise(backdated).await.unwrap();
    assert_eq!(earned_ids(&outcome), vec!["xp_100"]);

    let statuses = engine.badges(Some(BadgeCategory::Xp)).await.unwrap();
    let xp_100 = statuses.iter().find(|s| s.definition.id == "xp_100").unwrap();
    assert_eq!(xp_100.badge.earned_at, Some(now()));
  }

  #[tokio::test]
  async fn mood_streak_needs_a_check_in_today() {
    let mood_on = |day: NaiveDate| MoodEntry {
      id:   Uuid::new_v4(),
      date: day.and_hms_opt(9, 0, 0).unwrap().and_utc(),
      day,
      mood: Mood::Good,
      note: None,
    };
    let engine = engine(Snapshot {
      moods: vec![mood_on(days_ago(3)), mood_on(days_ago(2))],
      ..Snapshot::default()
    });

    let yesterday = engine
      .log_mood(NewMood::new(Mood::Okay, now() - chrono::Duration::days(1)))
      .await
      .unwrap();
    assert!(!earned_ids(&yesterday).contains(&"mood_streak_3"));

    let today = engine.log_mood(NewMood::new(Mood::Great, now())).await.unwrap();
    assert!(earned_ids(&today).contains(&"mood_streak_3"));
  }

  #[tokio::test]
  async fn restore_rearms_a_pending_streak_warning() {
    let store = MemoryStore::with_snapshot(Snapshot {
      progress: Progress {
        current_streak: 3,
        last_exercise_date: Some(today()),
        ..Progress::default()
      },
      completions: vec![completion_on(today(), ExerciseCategory::Reflect)],
      ..Snapshot::default()
    });
    store
      .save_reminder_settings(ReminderSettings {
        enabled: true,
        permission_requested: true,
        permission_granted: true,
        ..ReminderSettings::default()
      })
      .await
      .unwrap();
    // A fresh process: the scheduler holds nothing.
    let engine = Engine::new(
      store,
      MemoryScheduler::new(),
      EngineConfig { clock: Clock::Fixed(now()), ..EngineConfig::default() },
    );

    engine.restore_reminders().await.unwrap();

    assert_eq!(
      engine.scheduler().pending_trigger(STREAK_WARNING_ID),
      Some(Trigger::Once {
        date: today() + chrono::Days::new(1),
        time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
      })
    );
    assert_eq!(engine.pending_reminders().await.len(), 3);
  }

  #[tokio::test]
  async fn configured_time_is_kept_to_the_minute() {
    let engine = engine(Snapshot::default());
    let applied = engine
      .configure_reminders(ReminderSettings {
        enabled: true,
        mindfulness_time: NaiveTime::from_hms_opt(8, 30, 45).unwrap(),
        ..ReminderSettings::default()
      })
      .await
      .unwrap();

    let minute = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
    assert_eq!(applied.mindfulness_time, minute);
    assert_eq!(engine.reminder_settings().await.unwrap().mindfulness_time, minute);
    assert_eq!(
      engine.scheduler().pending_trigger(crate::reminder::MINDFULNESS_REMINDER_ID),
      Some(Trigger::Daily { time: minute, from: None })
    );
  }
}
