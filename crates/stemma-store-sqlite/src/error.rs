//! Error type for `stemma-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stemma_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// `true` when the underlying cause is a not-found condition — used by
  /// callers that map store failures onto protocol status codes.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Error::Core(
        stemma_core::Error::MemberNotFound(_)
          | stemma_core::Error::TreeNotFound(_)
      )
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
