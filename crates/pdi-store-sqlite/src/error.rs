//! Error type for `pdi-store-sqlite`.

use pdi_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain rejections and rows that fail to decode. Neither means the
  /// database is down.
  #[error("core error: {0}")]
  Core(#[from] pdi_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
}

impl Error {
  /// A stored value that does not decode.
  pub fn corrupt(what: impl std::fmt::Display) -> Self {
    Error::Core(pdi_core::Error::CorruptRecord(what.to_string()))
  }
}

impl StoreError for Error {
  fn domain(&self) -> Option<&pdi_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      Error::Database(_) => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
