//! Error type for `nikkei-store-sqlite`.

use nikkei_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A write rejected by the registry's domain rules.
  #[error(transparent)]
  Core(#[from] nikkei_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored label that no longer maps onto a known enum variant.
  #[error("cannot decode column {column}: {value:?}")]
  Decode {
    column: &'static str,
    value:  String,
  },
}

impl StoreError for Error {
  fn domain(&self) -> Option<&nikkei_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
