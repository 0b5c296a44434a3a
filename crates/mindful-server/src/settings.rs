//! Runtime configuration, layered from an optional TOML file and `MINDFUL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use mindful_core::{
  calendar::{Calendar, Clock},
  engine::{EngineConfig, XpRules},
};
use serde::Deserialize;

/// Server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Offset from UTC, in minutes, that defines the user's calendar day.
  pub utc_offset_minutes: i32,
  pub xp_per_exercise:    u64,
  pub xp_per_mood:        u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let xp = XpRules::default();
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8420,
      store_path:         PathBuf::from("~/.local/share/mindful/progress.sqlite"),
      utc_offset_minutes: 0,
      xp_per_exercise:    xp.per_exercise,
      xp_per_mood:        xp.per_mood,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and overlay `MINDFUL_*` environment
  /// variables, e.g. `MINDFUL_PORT=9000`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("MINDFUL"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The engine settings this configuration describes, on the system clock.
  pub fn engine_config(&self) -> mindful_core::Result<EngineConfig> {
    Ok(EngineConfig {
      calendar: Calendar::from_offset_minutes(self.utc_offset_minutes)?,
      clock: Clock::System,
      xp: XpRules { per_exercise: self.xp_per_exercise, per_mood: self.xp_per_mood },
      ..EngineConfig::default()
    })
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
