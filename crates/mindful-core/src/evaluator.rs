//! Achievement evaluation: turning progression state into earned badges.
//!
//! Each pass measures the user's metrics once, then walks the catalog. Every
//! definition is judged independently, so catalog order never changes the
//! outcome. Earned badges are skipped, which makes a repeated pass over
//! unchanged state return nothing new.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use strum::IntoEnumIterator as _;

use crate::{
  activity::ExerciseCategory,
  badge::{Badge, BadgeCategory, BadgeDefinition, Requirement},
  catalog::Catalog,
  store::Snapshot,
  streak,
};

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// The user's measurable state at evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
  pub streak:          u64,
  pub xp:              u64,
  pub mood_streak:     u64,
  pub mood_variety:    u64,
  pub perfect_day:     bool,
  pub category_counts: BTreeMap<ExerciseCategory, u64>,
}

impl Metrics {
  pub fn measure(snapshot: &Snapshot, today: NaiveDate) -> Self {
    Self {
      streak:          u64::from(snapshot.progress.current_streak),
      xp:              snapshot.progress.current_xp,
      mood_streak:     u64::from(streak::mood_streak_length(&snapshot.moods, today)),
      mood_variety:    u64::from(streak::unique_mood_count(&snapshot.moods)),
      perfect_day:     streak::has_perfect_day(&snapshot.completions, today),
      category_counts: ExerciseCategory::iter()
        .map(|c| (c, streak::category_count(&snapshot.completions, c)))
        .collect(),
    }
  }

  /// The current value of the metric `requirement` is judged on.
  pub fn value_for(&self, requirement: &Requirement) -> u64 {
    match requirement {
      Requirement::Streak { .. } => self.streak,
      Requirement::TotalXp { .. } => self.xp,
      Requirement::CategoryCount { category, .. } => {
        self.category_counts.get(category).copied().unwrap_or(0)
      }
      Requirement::MoodStreak { .. } => self.mood_streak,
      Requirement::MoodVariety { .. } => self.mood_variety,
      Requirement::PerfectDay => u64::from(self.perfect_day),
    }
  }

  pub fn meets(&self, requirement: &Requirement) -> bool {
    self.value_for(requirement) >= requirement.target()
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// The outcome of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
  /// Ids of badges that transitioned to earned in this pass.
  pub newly_earned: Vec<&'static str>,
  /// Instances whose progress or earned state changed and must be persisted.
  pub changed:      Vec<Badge>,
}

impl Evaluation {
  /// Whether anything needs to be written back.
  pub fn is_dirty(&self) -> bool { !self.changed.is_empty() }
}

// ─── Evaluator ───────────────────────────────────────────────────────────────

/// Evaluates a [`Catalog`] against a [`Snapshot`].
pub struct Evaluator<'a> {
  catalog: &'a Catalog,
}

impl<'a> Evaluator<'a> {
  pub fn new(catalog: &'a Catalog) -> Self { Self { catalog } }

  /// Evaluate every definition. Updates `snapshot.badges` in place.
  ///
  /// `now` stamps newly-earned badges; `today` anchors the mood streak and the
  /// perfect-day check.
  pub fn evaluate(
    &self,
    snapshot: &mut Snapshot,
    now: DateTime<Utc>,
    today: NaiveDate,
  ) -> Evaluation {
    self.run(self.catalog.definitions().iter(), snapshot, now, today)
  }

  /// Same as [`evaluate`](Self::evaluate), restricted to one badge category.
  pub fn evaluate_category(
    &self,
    category: BadgeCategory,
    snapshot: &mut Snapshot,
    now: DateTime<Utc>,
    today: NaiveDate,
  ) -> Evaluation {
    self.run(self.catalog.by_category(category), snapshot, now, today)
  }

  fn run<'d>(
    &self,
    definitions: impl Iterator<Item = &'d BadgeDefinition>,
    snapshot: &mut Snapshot,
    now: DateTime<Utc>,
    today: NaiveDate,
  ) -> Evaluation {
    let metrics = Metrics::measure(snapshot, today);
    let mut evaluation = Evaluation::default();

    for definition in definitions {
      let badge = get_or_create(&mut snapshot.badges, definition.id);
      let requirement = &definition.requirement;

      if badge.is_earned() {
        if requirement.is_monotone() && !metrics.meets(requirement) {
          invariant_violation(&format!(
            "badge {} is earned but its requirement no longer holds",
            definition.id
          ));
        }
        continue;
      }

      let target = requirement.target();
      if metrics.meets(requirement) {
        badge.earned_at = Some(now);
        badge.progress = target;
        tracing::info!(badge = definition.id, "badge earned");
        evaluation.newly_earned.push(definition.id);
        evaluation.changed.push(badge.clone());
        continue;
      }

      let progress = metrics.value_for(requirement).min(target);
      if progress > badge.progress {
        badge.progress = progress;
        evaluation.changed.push(badge.clone());
      }
    }

    tracing::debug!(
      earned = evaluation.newly_earned.len(),
      changed = evaluation.changed.len(),
      "badge evaluation finished"
    );
    evaluation
  }
}

/// Find the instance for `id`, creating a fresh one if none exists. Calling
/// it twice for the same id returns the same instance.
fn get_or_create<'b>(badges: &'b mut Vec<Badge>, id: &str) -> &'b mut Badge {
  let matches = badges.iter().filter(|b| b.id == id).count();
  if matches > 1 {
    invariant_violation(&format!("{matches} instances of badge {id}"));
  }

  match badges.iter().position(|b| b.id == id) {
    Some(index) => &mut badges[index],
    None => {
      badges.push(Badge::new(id));
      let last = badges.len() - 1;
      &mut badges[last]
    }
  }
}

/// A catalog or evaluator bug. Fatal in debug builds and tests; logged and
/// tolerated in release builds.
fn invariant_violation(message: &str) {
  tracing::error!("invariant violation: {message}");
  if cfg!(debug_assertions) {
    panic!("invariant violation: {message}");
  }
}
