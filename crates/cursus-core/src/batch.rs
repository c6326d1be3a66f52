//! Per-row results of batch writes.
//!
//! Batch operations never fail because of an individual invalid row; instead
//! they report which rows were written and which were left out.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
  /// The row was inserted, or replaced an existing one with the same key.
  Applied,
  /// The row referenced a participant or skill outside its session.
  SkippedInvalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult<T> {
  pub row:     T,
  pub outcome: RowOutcome,
}

/// The outcome of a whole batch, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport<T> {
  pub rows: Vec<RowResult<T>>,
}

impl<T> BatchReport<T> {
  pub fn applied(&self) -> usize { self.count(RowOutcome::Applied) }

  pub fn skipped(&self) -> usize { self.count(RowOutcome::SkippedInvalid) }

  fn count(&self, outcome: RowOutcome) -> usize {
    self.rows.iter().filter(|r| r.outcome == outcome).count()
  }
}

impl<T> FromIterator<RowResult<T>> for BatchReport<T> {
  fn from_iter<I: IntoIterator<Item = RowResult<T>>>(iter: I) -> Self {
    Self { rows: iter.into_iter().collect() }
  }
}
