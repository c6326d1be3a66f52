//! Dependency-ordered deletion of aggregates.
//!
//! Each aggregate is described by a [`CascadePlan`]: the root row, identified
//! by its key columns, and the edges to clear before it can go. One walker
//! executes every plan, so the deletion order lives in data rather than in
//! hand-written sequences of statements.

use cursus_core::error::{Entity, Error as CoreError};
use rusqlite::ToSql;
use tracing::{debug, error};

use crate::{Error, Result, gateway::UnitOfWork};

/// A dependency of the root row.
#[derive(Debug)]
pub enum Edge {
  /// Delete the rows of `table` whose `columns` equal the root key, column
  /// for column.
  Delete {
    table:   &'static str,
    columns: &'static [&'static str],
  },
  /// Null out `column` in `table` where it holds the first key value.
  Detach {
    table:  &'static str,
    column: &'static str,
  },
}

#[derive(Debug)]
pub struct CascadePlan {
  pub entity: Entity,
  pub root:   &'static str,
  pub key:    &'static [&'static str],
  pub edges:  &'static [Edge],
}

// ─── Plans ───────────────────────────────────────────────────────────────────

pub const AGENT: CascadePlan = CascadePlan {
  entity: Entity::Agent,
  root:   "agents",
  key:    &["matricule"],
  edges:  &[
    Edge::Delete { table: "evaluations", columns: &["matricule"] },
    Edge::Delete { table: "attendance", columns: &["matricule"] },
    Edge::Delete { table: "participants", columns: &["matricule"] },
    Edge::Detach { table: "sessions", column: "trainer_matricule" },
    Edge::Delete { table: "trainers", columns: &["matricule"] },
  ],
};

pub const SESSION: CascadePlan = CascadePlan {
  entity: Entity::Session,
  root:   "sessions",
  key:    &["code"],
  edges:  &[
    Edge::Delete { table: "evaluations", columns: &["session_code"] },
    Edge::Delete { table: "attendance", columns: &["session_code"] },
    Edge::Delete { table: "participants", columns: &["session_code"] },
  ],
};

/// Unenrolling drops the participant's attendance and scores with it.
pub const PARTICIPANT: CascadePlan = CascadePlan {
  entity: Entity::Participant,
  root:   "participants",
  key:    &["session_code", "matricule"],
  edges:  &[
    Edge::Delete {
      table:   "evaluations",
      columns: &["session_code", "matricule"],
    },
    Edge::Delete {
      table:   "attendance",
      columns: &["session_code", "matricule"],
    },
  ],
};

pub const CATALOGUE: CascadePlan = CascadePlan {
  entity: Entity::Catalogue,
  root:   "catalogues",
  key:    &["catalogue_id"],
  edges:  &[Edge::Delete {
    table:   "catalogue_skills",
    columns: &["catalogue_id"],
  }],
};

// ─── Walker ──────────────────────────────────────────────────────────────────

fn predicate(columns: &[&str]) -> String {
  columns
    .iter()
    .enumerate()
    .map(|(i, c)| format!("{c} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(" AND ")
}

impl CascadePlan {
  /// Delete the root row identified by `key` and everything depending on it.
  ///
  /// A missing root fails with [`CoreError::NotFound`] before anything is
  /// touched. Any failure past that point is reported as
  /// [`Error::DeletionFailed`]; the enclosing unit of work rolls it back.
  pub fn run(
    &self,
    uow: &UnitOfWork<'_>,
    key: &[&dyn ToSql],
    label: &str,
  ) -> Result<()> {
    let root_predicate = predicate(self.key);
    let found = uow.exists(
      &format!("SELECT 1 FROM {} WHERE {root_predicate}", self.root),
      key,
    )?;
    if !found {
      return Err(CoreError::not_found(self.entity, label).into());
    }

    self.walk(uow, key, &root_predicate).map_err(|source| {
      error!(entity = %self.entity, key = label, error = %source, "cascade delete failed");
      Error::DeletionFailed {
        entity: self.entity,
        key:    label.to_owned(),
        source: Box::new(source),
      }
    })
  }

  fn walk(
    &self,
    uow: &UnitOfWork<'_>,
    key: &[&dyn ToSql],
    root_predicate: &str,
  ) -> Result<()> {
    for edge in self.edges {
      match edge {
        Edge::Delete { table, columns } => {
          let n = uow.execute(
            &format!("DELETE FROM {table} WHERE {}", predicate(columns)),
            key,
          )?;
          debug!(root = self.root, table, rows = n, "deleted dependents");
        }
        Edge::Detach { table, column } => {
          let n = uow.execute(
            &format!("UPDATE {table} SET {column} = NULL WHERE {column} = ?1"),
            &key[..1],
          )?;
          debug!(root = self.root, table, column, rows = n, "detached references");
        }
      }
    }

    uow.execute(
      &format!("DELETE FROM {} WHERE {root_predicate}", self.root),
      key,
    )?;
    debug!(root = self.root, "deleted root row");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn predicate_numbers_placeholders_in_order() {
    assert_eq!(
      predicate(&["session_code", "matricule"]),
      "session_code = ?1 AND matricule = ?2"
    );
  }

  #[test]
  fn edge_keys_match_root_key_width() {
    for plan in [&AGENT, &SESSION, &PARTICIPANT, &CATALOGUE] {
      for edge in plan.edges {
        match edge {
          Edge::Delete { columns, .. } => {
            assert_eq!(columns.len(), plan.key.len(), "{plan:?}")
          }
          Edge::Detach { .. } => assert_eq!(plan.key.len(), 1),
        }
      }
    }
  }
}
