//! Error types for `dissmon-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unrecognised registry date: {0:?}")]
  InvalidDate(String),

  #[error("cannot derive a case id from {0:?}")]
  InvalidCaseId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
