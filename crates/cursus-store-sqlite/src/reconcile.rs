//! Reference-data reconciliation between catalogues and skills.
//!
//! Skills are identified by their description. Linking a catalogue to a list
//! of descriptions finds or creates each skill with one atomic upsert, then
//! inserts the junction rows. Callers run this inside a unit of work so a
//! failure never leaves a partial skill set behind.

use cursus_core::{catalogue::Skill, error::Conflict};
use rusqlite::params;

use crate::{Result, gateway::{ConflictExt as _, UnitOfWork}};

/// Find or create the skill described by `description`.
pub fn resolve_skill(uow: &UnitOfWork<'_>, description: &str) -> Result<Skill> {
  uow.query_one(
    "INSERT INTO skills (description) VALUES (?1)
     ON CONFLICT(description) DO UPDATE SET description = excluded.description
     RETURNING skill_id, description",
    params![description],
    |row| {
      Ok(Skill {
        skill_id:    row.get(0)?,
        description: row.get(1)?,
      })
    },
  )
}

/// Link `catalogue_id` to each described skill, in input order.
///
/// A description listed twice violates the junction key and fails with
/// [`Conflict::DuplicateSkill`].
pub fn link_skills(
  uow: &UnitOfWork<'_>,
  catalogue_id: i64,
  descriptions: &[String],
) -> Result<Vec<Skill>> {
  let mut linked = Vec::with_capacity(descriptions.len());
  for description in descriptions.iter().map(|d| d.trim()) {
    let skill = resolve_skill(uow, description)?;
    uow
      .execute(
        "INSERT INTO catalogue_skills (catalogue_id, skill_id) VALUES (?1, ?2)",
        params![catalogue_id, skill.skill_id],
      )
      .or_conflict(|| Conflict::DuplicateSkill(description.to_owned()))?;
    linked.push(skill);
  }
  Ok(linked)
}

/// Replace every existing link of `catalogue_id` with `descriptions`.
pub fn replace_skills(
  uow: &UnitOfWork<'_>,
  catalogue_id: i64,
  descriptions: &[String],
) -> Result<Vec<Skill>> {
  uow.execute(
    "DELETE FROM catalogue_skills WHERE catalogue_id = ?1",
    params![catalogue_id],
  )?;
  link_skills(uow, catalogue_id, descriptions)
}
