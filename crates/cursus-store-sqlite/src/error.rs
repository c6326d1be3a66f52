//! Error type for `cursus-store-sqlite`.

use cursus_core::error::{Conflict, Entity, InvalidState, StoreError};
use thiserror::Error;

/// Misuse of a [`crate::UnitOfWork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransactionState {
  #[error("a transaction is already active")]
  AlreadyActive,

  #[error("no transaction is active")]
  NoActiveTransaction,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] cursus_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("query failed: {0}")]
  Query(#[from] rusqlite::Error),

  #[error(transparent)]
  TransactionState(#[from] TransactionState),

  /// A cascade step failed; the unit of work was rolled back.
  #[error("deleting {entity} {key} failed")]
  DeletionFailed {
    entity: Entity,
    key:    String,
    #[source]
    source: Box<Error>,
  },
}

impl From<Conflict> for Error {
  fn from(e: Conflict) -> Self { Self::Core(e.into()) }
}

impl From<InvalidState> for Error {
  fn from(e: InvalidState) -> Self { Self::Core(e.into()) }
}

impl StoreError for Error {
  fn domain(&self) -> Option<&cursus_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
