//! Error types for `pdi-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("actor not found: {0}")]
  ActorNotFound(Uuid),

  #[error("entity not found: {0}")]
  EntityNotFound(Uuid),

  #[error("team not found: {0}")]
  TeamNotFound(Uuid),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("unknown actor status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown entity class: {0:?}")]
  UnknownEntityClass(String),

  #[error("score {0} is outside the 1..=5 scale")]
  ScoreOutOfRange(u8),

  #[error("invalid record: {0}")]
  InvalidRecord(String),

  /// A stored row that cannot be decoded. The datastore answered, so this
  /// never degrades the service, but it is not the caller's fault either.
  #[error("corrupt stored record: {0}")]
  CorruptRecord(String),

  #[error("mutation already settled")]
  MutationSettled,
}

impl StoreError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
