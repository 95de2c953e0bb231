//! Error types for the dissmon-markup extractor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed markup at byte {position}: {message}")]
  Markup { position: u64, message: String },

  #[error("required anchor not found: {0}")]
  MissingAnchor(&'static str),

  #[error("label not found: {0:?}")]
  MissingLabel(String),

  #[error(transparent)]
  Core(#[from] dissmon_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
