//! Error types for `sujet-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sujet not found: {0}")]
  NotFound(i64),

  #[error("invalid input: {0}")]
  InvalidInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
