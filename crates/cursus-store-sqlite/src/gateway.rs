//! Transactional query gateway.
//!
//! A [`UnitOfWork`] borrows one connection and tracks whether it holds an open
//! transaction. Statements issued through it run inside that transaction when
//! one is active and in autocommit mode otherwise.

use cursus_core::error::Conflict;
use rusqlite::{Connection, ErrorCode, OptionalExtension as _, Params, Row, ffi};
use tracing::warn;

use crate::{Error, Result, TransactionState};

pub struct UnitOfWork<'c> {
  conn:   &'c Connection,
  active: bool,
}

impl<'c> UnitOfWork<'c> {
  /// A unit of work with no transaction open yet.
  pub fn new(conn: &'c Connection) -> Self { Self { conn, active: false } }

  /// Run `f` inside a transaction: commit when it succeeds, roll back and
  /// return its error when it fails.
  pub fn scope<T>(
    conn: &'c Connection,
    f: impl FnOnce(&mut Self) -> Result<T>,
  ) -> Result<T> {
    let mut uow = Self::new(conn);
    uow.begin()?;
    match f(&mut uow) {
      Ok(value) => {
        uow.commit()?;
        Ok(value)
      }
      Err(err) => {
        if let Err(rollback_err) = uow.rollback() {
          warn!(error = %rollback_err, "rollback failed");
        }
        Err(err)
      }
    }
  }

  pub fn is_active(&self) -> bool { self.active }

  // ── Transaction control ───────────────────────────────────────────────

  pub fn begin(&mut self) -> Result<()> {
    if self.active {
      return Err(TransactionState::AlreadyActive.into());
    }
    self.conn.execute_batch("BEGIN IMMEDIATE")?;
    self.active = true;
    Ok(())
  }

  pub fn commit(&mut self) -> Result<()> {
    if !self.active {
      return Err(TransactionState::NoActiveTransaction.into());
    }
    // A failed COMMIT leaves the transaction open; it stays ours to roll
    // back.
    self.conn.execute_batch("COMMIT")?;
    self.active = false;
    Ok(())
  }

  pub fn rollback(&mut self) -> Result<()> {
    if !self.active {
      return Err(TransactionState::NoActiveTransaction.into());
    }
    self.active = false;
    self.conn.execute_batch("ROLLBACK")?;
    Ok(())
  }

  // ── Statements ────────────────────────────────────────────────────────

  /// Run a statement and return the number of rows it changed.
  pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
    Ok(self.conn.prepare_cached(sql)?.execute(params)?)
  }

  pub fn query<T, P: Params>(
    &self,
    sql: &str,
    params: P,
    f: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Vec<T>> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let rows = stmt
      .query_map(params, f)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// The first row, if any.
  pub fn query_opt<T, P: Params>(
    &self,
    sql: &str,
    params: P,
    f: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Option<T>> {
    Ok(self.conn.prepare_cached(sql)?.query_row(params, f).optional()?)
  }

  /// The first row; no row at all is a query error.
  pub fn query_one<T, P: Params>(
    &self,
    sql: &str,
    params: P,
    f: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<T> {
    Ok(self.conn.prepare_cached(sql)?.query_row(params, f)?)
  }

  pub fn exists<P: Params>(&self, sql: &str, params: P) -> Result<bool> {
    Ok(self.query_opt(sql, params, |_| Ok(()))?.is_some())
  }
}

impl Drop for UnitOfWork<'_> {
  fn drop(&mut self) {
    if self.active {
      if let Err(e) = self.conn.execute_batch("ROLLBACK") {
        warn!(error = %e, "rollback of abandoned unit of work failed");
      }
    }
  }
}

// ─── Constraint mapping ──────────────────────────────────────────────────────

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == ErrorCode::ConstraintViolation
        && matches!(
          f.extended_code,
          ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
  )
}

pub(crate) trait ConflictExt<T> {
  /// Turn a UNIQUE or PRIMARY KEY violation into the given conflict.
  fn or_conflict(self, conflict: impl FnOnce() -> Conflict) -> Result<T>;
}

impl<T> ConflictExt<T> for Result<T> {
  fn or_conflict(self, conflict: impl FnOnce() -> Conflict) -> Result<T> {
    match self {
      Err(Error::Query(e)) if is_unique_violation(&e) => Err(conflict().into()),
      other => other,
    }
  }
}
