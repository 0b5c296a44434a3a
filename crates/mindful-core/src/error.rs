//! Error types for `mindful-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A read or write against the progress store failed. Nothing from the
  /// current pipeline run was persisted.
  #[error("store error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Catalog or evaluator bug: duplicate badge ids, or an earned badge whose
  /// monotone requirement no longer holds.
  #[error("invariant violation: {0}")]
  InvariantViolation(String),

  #[error("utc offset out of range: {0} minutes")]
  InvalidUtcOffset(i32),
}

impl Error {
  /// Wrap a backend error from a [`ProgressStore`](crate::store::ProgressStore).
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
