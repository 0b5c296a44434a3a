//! The badge catalog, the single source of truth for badge thresholds.

use std::collections::HashSet;

use crate::{
  Error, Result,
  activity::ExerciseCategory::{Awareness, Balance, Reflect},
  badge::{
    BadgeCategory, BadgeDefinition,
    Rarity::{self, Common, Epic, Legendary, Rare},
    Requirement::{self, CategoryCount, MoodStreak, MoodVariety, PerfectDay, Streak, TotalXp},
  },
};

/// An immutable, validated set of badge definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
  definitions: Vec<BadgeDefinition>,
}

impl Catalog {
  /// Build a catalog, rejecting duplicate ids.
  pub fn new(definitions: Vec<BadgeDefinition>) -> Result<Self> {
    let mut seen = HashSet::new();
    for def in &definitions {
      if !seen.insert(def.id) {
        return Err(Error::InvariantViolation(format!(
          "duplicate badge id in catalog: {}",
          def.id
        )));
      }
    }
    Ok(Self { definitions })
  }

  /// The built-in badge set shipped with the app.
  pub fn standard() -> Self { Self { definitions: STANDARD.to_vec() } }

  pub fn definitions(&self) -> &[BadgeDefinition] { &self.definitions }

  pub fn by_id(&self, id: &str) -> Option<&BadgeDefinition> {
    self.definitions.iter().find(|d| d.id == id)
  }

  pub fn by_category(
    &self,
    category: BadgeCategory,
  ) -> impl Iterator<Item = &BadgeDefinition> {
    self.definitions.iter().filter(move |d| d.category == category)
  }
}

impl Default for Catalog {
  fn default() -> Self { Self::standard() }
}

// ─── Built-in definitions ────────────────────────────────────────────────────

const fn def(
  id: &'static str,
  name: &'static str,
  description: &'static str,
  category: BadgeCategory,
  requirement: Requirement,
  rarity: Rarity,
) -> BadgeDefinition {
  BadgeDefinition { id, name, description, category, requirement, rarity }
}

const STANDARD: &[BadgeDefinition] = &[
  // Streaks
  def("streak_3", "Getting Started", "Practice 3 days in a row", BadgeCategory::Streak, Streak { days: 3 }, Common),
  def("streak_7", "Week Warrior", "Practice 7 days in a row", BadgeCategory::Streak, Streak { days: 7 }, Common),
  def("streak_14", "Fortnight Focus", "Practice 14 days in a row", BadgeCategory::Streak, Streak { days: 14 }, Rare),
  def("streak_30", "Monthly Master", "Practice 30 days in a row", BadgeCategory::Streak, Streak { days: 30 }, Epic),
  def("streak_100", "Centurion", "Practice 100 days in a row", BadgeCategory::Streak, Streak { days: 100 }, Legendary),
  // XP
  def("xp_100", "First Hundred", "Earn 100 XP", BadgeCategory::Xp, TotalXp { amount: 100 }, Common),
  def("xp_500", "Rising Mind", "Earn 500 XP", BadgeCategory::Xp, TotalXp { amount: 500 }, Rare),
  def("xp_1000", "Seasoned", "Earn 1,000 XP", BadgeCategory::Xp, TotalXp { amount: 1000 }, Epic),
  def("xp_5000", "Sage", "Earn 5,000 XP", BadgeCategory::Xp, TotalXp { amount: 5000 }, Legendary),
  // Per-category counts
  def("awareness_10", "Aware", "Complete 10 awareness exercises", BadgeCategory::Category, CategoryCount { category: Awareness, count: 10 }, Common),
  def("awareness_25", "Attentive", "Complete 25 awareness exercises", BadgeCategory::Category, CategoryCount { category: Awareness, count: 25 }, Rare),
  def("awareness_50", "Present", "Complete 50 awareness exercises", BadgeCategory::Category, CategoryCount { category: Awareness, count: 50 }, Epic),
  def("balance_10", "Steady", "Complete 10 balance exercises", BadgeCategory::Category, CategoryCount { category: Balance, count: 10 }, Common),
  def("balance_25", "Grounded", "Complete 25 balance exercises", BadgeCategory::Category, CategoryCount { category: Balance, count: 25 }, Rare),
  def("balance_50", "Centered", "Complete 50 balance exercises", BadgeCategory::Category, CategoryCount { category: Balance, count: 50 }, Epic),
  def("reflect_10", "Thoughtful", "Complete 10 reflection exercises", BadgeCategory::Category, CategoryCount { category: Reflect, count: 10 }, Common),
  def("reflect_25", "Introspective", "Complete 25 reflection exercises", BadgeCategory::Category, CategoryCount { category: Reflect, count: 25 }, Rare),
  def("reflect_50", "Insightful", "Complete 50 reflection exercises", BadgeCategory::Category, CategoryCount { category: Reflect, count: 50 }, Epic),
  // Moods
  def("mood_streak_3", "Checking In", "Log your mood 3 days in a row", BadgeCategory::Mood, MoodStreak { days: 3 }, Common),
  def("mood_streak_7", "Self-Aware", "Log your mood 7 days in a row", BadgeCategory::Mood, MoodStreak { days: 7 }, Rare),
  def("mood_streak_30", "Emotional Insight", "Log your mood 30 days in a row", BadgeCategory::Mood, MoodStreak { days: 30 }, Epic),
  def("mood_variety_3", "Range", "Log 3 different moods", BadgeCategory::Mood, MoodVariety { distinct: 3 }, Common),
  def("mood_variety_5", "Full Spectrum", "Log every mood at least once", BadgeCategory::Mood, MoodVariety { distinct: 5 }, Rare),
  // Achievements
  def("perfect_day", "Perfect Day", "Complete an awareness, balance and reflection exercise on the same day", BadgeCategory::Achievement, PerfectDay, Rare),
];
