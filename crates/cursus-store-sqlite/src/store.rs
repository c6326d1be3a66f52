//! [`SqliteStore`] — the SQLite implementation of [`TrainingStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Row, params};
use tracing::{info, warn};

use cursus_core::{
  agent::{Agent, AgentUpdate, NewAgent},
  aggregate,
  attendance::{
    AttendanceInput, AttendanceRecord, AttendanceSummary, DayStatus,
    RosterEntry, TrainingCalendar,
  },
  batch::{BatchReport, RowOutcome, RowResult},
  cabinet::{Cabinet, CabinetDetail, CabinetSession, CabinetSummary, NewCabinet},
  catalogue::{Catalogue, CatalogueDetail, NewCatalogue, Skill},
  error::{Conflict, Entity, Error as CoreError, InvalidState},
  evaluation::{
    EvaluationInput, EvaluationMatrix, EvaluationRecord, EvaluationSummary,
    MAX_SCORE, MIN_SCORE, ParticipantEvaluation, ParticipantInfo, ScoreRow,
    SkillScore,
  },
  session::{
    Enrollee, Facilitator, NewSession, Session, SessionDetail, SessionSummary,
    SessionUpdate,
  },
  store::TrainingStore,
};

use crate::{
  Result,
  cascade,
  encode::{
    attendance, category, contains_pattern, date, encode_attendance,
    encode_category, encode_date, encode_session_type, encode_status, opt_date,
    session_type, status,
  },
  gateway::{ConflictExt as _, UnitOfWork},
  reconcile,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cursus training store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    info!(path = %path.display(), "opened training store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run read-only statements in autocommit mode.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&UnitOfWork<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| Ok(f(&UnitOfWork::new(conn))))
      .await?
  }

  /// Run `f` as one transaction.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut UnitOfWork<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| Ok(UnitOfWork::scope(conn, f)))
      .await?
  }

  /// Run raw SQL against the connection; lets tests inject failures.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn count_rows(&self, table: &'static str) -> Result<i64> {
    self
      .read(move |uow| {
        uow.query_one(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
      })
      .await
  }
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

const AGENT_SELECT: &str = "
  SELECT a.matricule, a.name, a.job_function, a.hire_date, t.domain
  FROM agents a
  LEFT JOIN trainers t ON t.matricule = a.matricule";

fn agent_row(row: &Row<'_>) -> rusqlite::Result<Agent> {
  Ok(Agent {
    matricule:      row.get(0)?,
    name:           row.get(1)?,
    job_function:   row.get(2)?,
    hire_date:      opt_date(row, 3)?,
    trainer_domain: row.get(4)?,
  })
}

fn skill_row(row: &Row<'_>) -> rusqlite::Result<Skill> {
  Ok(Skill { skill_id: row.get(0)?, description: row.get(1)? })
}

const CATALOGUE_SELECT: &str = "
  SELECT catalogue_id, name, description, objective, prerequisites, category
  FROM catalogues";

fn catalogue_row(row: &Row<'_>) -> rusqlite::Result<Catalogue> {
  Ok(Catalogue {
    catalogue_id:  row.get(0)?,
    name:          row.get(1)?,
    description:   row.get(2)?,
    objective:     row.get(3)?,
    prerequisites: row.get(4)?,
    category:      category(row, 5)?,
  })
}

fn cabinet_row(row: &Row<'_>) -> rusqlite::Result<Cabinet> {
  Ok(Cabinet {
    cabinet_id: row.get(0)?,
    name:       row.get(1)?,
    phone:      row.get(2)?,
    location:   row.get(3)?,
  })
}

/// Columns `0..=7` of every session query.
const SESSION_COLUMNS: &str = "s.code, s.catalogue_id, s.start_date, \
  s.end_date, s.session_type, s.status, s.trainer_matricule, s.cabinet_id";

fn session_row(row: &Row<'_>) -> rusqlite::Result<Session> {
  Ok(Session {
    code:              row.get(0)?,
    catalogue_id:      row.get(1)?,
    start_date:        date(row, 2)?,
    end_date:          date(row, 3)?,
    session_type:      session_type(row, 4)?,
    status:            status(row, 5)?,
    trainer_matricule: row.get(6)?,
    cabinet_id:        row.get(7)?,
  })
}

fn summary_sql(filter: &str) -> String {
  format!(
    "SELECT {SESSION_COLUMNS},
            c.name, c.category, a.name, cab.name, COUNT(p.matricule)
     FROM sessions s
     JOIN catalogues c     ON c.catalogue_id = s.catalogue_id
     LEFT JOIN agents a    ON a.matricule    = s.trainer_matricule
     LEFT JOIN cabinets cab ON cab.cabinet_id = s.cabinet_id
     LEFT JOIN participants p ON p.session_code = s.code
     {filter}
     GROUP BY s.code
     ORDER BY s.start_date DESC, s.code DESC"
  )
}

fn summary_row(row: &Row<'_>) -> rusqlite::Result<SessionSummary> {
  Ok(SessionSummary {
    session:            session_row(row)?,
    catalogue_name:     row.get(8)?,
    catalogue_category: category(row, 9)?,
    trainer_name:       row.get(10)?,
    cabinet_name:       row.get(11)?,
    participant_count:  row.get(12)?,
  })
}

fn enrollee_row(row: &Row<'_>) -> rusqlite::Result<Enrollee> {
  Ok(Enrollee {
    matricule:    row.get(0)?,
    name:         row.get(1)?,
    job_function: row.get(2)?,
    hire_date:    opt_date(row, 3)?,
  })
}

// ─── Shared lookups ──────────────────────────────────────────────────────────

fn not_found(entity: Entity, key: impl ToString) -> crate::Error {
  CoreError::not_found(entity, key).into()
}

fn participant_key(code: i64, matricule: &str) -> String {
  format!("{matricule} in session {code}")
}

fn require_session(uow: &UnitOfWork<'_>, code: i64) -> Result<()> {
  if uow.exists("SELECT 1 FROM sessions WHERE code = ?1", params![code])? {
    Ok(())
  } else {
    Err(not_found(Entity::Session, code))
  }
}

fn require_catalogue(uow: &UnitOfWork<'_>, id: i64) -> Result<()> {
  let sql = "SELECT 1 FROM catalogues WHERE catalogue_id = ?1";
  if uow.exists(sql, params![id])? {
    Ok(())
  } else {
    Err(not_found(Entity::Catalogue, id))
  }
}

fn require_cabinet(uow: &UnitOfWork<'_>, id: i64) -> Result<()> {
  let sql = "SELECT 1 FROM cabinets WHERE cabinet_id = ?1";
  if uow.exists(sql, params![id])? {
    Ok(())
  } else {
    Err(not_found(Entity::Cabinet, id))
  }
}

fn is_enrolled(uow: &UnitOfWork<'_>, code: i64, matricule: &str) -> Result<bool> {
  uow.exists(
    "SELECT 1 FROM participants WHERE session_code = ?1 AND matricule = ?2",
    params![code, matricule],
  )
}

fn require_participant(
  uow: &UnitOfWork<'_>,
  code: i64,
  matricule: &str,
) -> Result<()> {
  if is_enrolled(uow, code, matricule)? {
    Ok(())
  } else {
    Err(not_found(Entity::Participant, participant_key(code, matricule)))
  }
}

/// The trainer or cabinet a session points at must exist.
fn require_facilitator(uow: &UnitOfWork<'_>, f: &Facilitator) -> Result<()> {
  match f {
    Facilitator::Trainer(m) => {
      let sql = "SELECT 1 FROM trainers WHERE matricule = ?1";
      if uow.exists(sql, params![m])? {
        Ok(())
      } else {
        Err(not_found(Entity::Trainer, m))
      }
    }
    Facilitator::Cabinet(id) => require_cabinet(uow, *id),
  }
}

fn load_agent(uow: &UnitOfWork<'_>, matricule: &str) -> Result<Option<Agent>> {
  uow.query_opt(
    &format!("{AGENT_SELECT} WHERE a.matricule = ?1"),
    params![matricule],
    agent_row,
  )
}

fn catalogue_skills_of(uow: &UnitOfWork<'_>, id: i64) -> Result<Vec<Skill>> {
  uow.query(
    "SELECT s.skill_id, s.description
     FROM skills s
     JOIN catalogue_skills cs ON cs.skill_id = s.skill_id
     WHERE cs.catalogue_id = ?1
     ORDER BY s.description",
    params![id],
    skill_row,
  )
}

fn load_catalogue(
  uow: &UnitOfWork<'_>,
  id: i64,
) -> Result<Option<CatalogueDetail>> {
  let catalogue = uow.query_opt(
    &format!("{CATALOGUE_SELECT} WHERE catalogue_id = ?1"),
    params![id],
    catalogue_row,
  )?;
  catalogue
    .map(|catalogue| -> Result<CatalogueDetail> {
      let skills = catalogue_skills_of(uow, id)?;
      Ok(CatalogueDetail { catalogue, skills })
    })
    .transpose()
}

fn participants_of(uow: &UnitOfWork<'_>, code: i64) -> Result<Vec<Enrollee>> {
  uow.query(
    "SELECT a.matricule, a.name, a.job_function, a.hire_date
     FROM participants p
     JOIN agents a ON a.matricule = p.matricule
     WHERE p.session_code = ?1
     ORDER BY a.name",
    params![code],
    enrollee_row,
  )
}

fn session_skills_of(uow: &UnitOfWork<'_>, code: i64) -> Result<Vec<Skill>> {
  uow.query(
    "SELECT sk.skill_id, sk.description
     FROM skills sk
     JOIN catalogue_skills cs ON cs.skill_id    = sk.skill_id
     JOIN sessions s          ON s.catalogue_id = cs.catalogue_id
     WHERE s.code = ?1
     ORDER BY sk.description",
    params![code],
    skill_row,
  )
}

fn load_session(uow: &UnitOfWork<'_>, code: i64) -> Result<Option<SessionDetail>> {
  let sql = format!(
    "SELECT {SESSION_COLUMNS},
            c.name, c.description, c.objective, c.category,
            a.name, cab.name, cab.phone, cab.location
     FROM sessions s
     JOIN catalogues c      ON c.catalogue_id = s.catalogue_id
     LEFT JOIN agents a     ON a.matricule    = s.trainer_matricule
     LEFT JOIN cabinets cab ON cab.cabinet_id = s.cabinet_id
     WHERE s.code = ?1"
  );
  let detail = uow.query_opt(&sql, params![code], |row| {
    Ok(SessionDetail {
      session:               session_row(row)?,
      catalogue_name:        row.get(8)?,
      catalogue_description: row.get(9)?,
      catalogue_objective:   row.get(10)?,
      catalogue_category:    category(row, 11)?,
      trainer_name:          row.get(12)?,
      cabinet_name:          row.get(13)?,
      cabinet_phone:         row.get(14)?,
      cabinet_location:      row.get(15)?,
      participants:          Vec::new(),
    })
  })?;

  detail
    .map(|mut d| -> Result<SessionDetail> {
      d.participants = participants_of(uow, code)?;
      Ok(d)
    })
    .transpose()
}

fn reload_session(uow: &UnitOfWork<'_>, code: i64) -> Result<SessionDetail> {
  load_session(uow, code)?.ok_or_else(|| not_found(Entity::Session, code))
}

fn check_score(score: f64) -> Result<()> {
  if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
    Ok(())
  } else {
    Err(
      CoreError::validation(format!(
        "score {score} is outside {MIN_SCORE}..={MAX_SCORE}"
      ))
      .into(),
    )
  }
}

// ─── TrainingStore impl ──────────────────────────────────────────────────────

impl TrainingStore for SqliteStore {
  type Error = crate::Error;

  // ── Agents ────────────────────────────────────────────────────────────────

  async fn list_agents(&self) -> Result<Vec<Agent>> {
    self
      .read(|uow| {
        uow.query(&format!("{AGENT_SELECT} ORDER BY a.name"), [], agent_row)
      })
      .await
  }

  async fn list_trainers(&self) -> Result<Vec<Agent>> {
    self
      .read(|uow| {
        uow.query(
          "SELECT a.matricule, a.name, a.job_function, a.hire_date, t.domain
           FROM agents a
           JOIN trainers t ON t.matricule = a.matricule
           ORDER BY a.name",
          [],
          agent_row,
        )
      })
      .await
  }

  async fn get_agent(&self, matricule: String) -> Result<Option<Agent>> {
    self.read(move |uow| load_agent(uow, &matricule)).await
  }

  async fn create_agent(&self, input: NewAgent) -> Result<Agent> {
    self
      .write(move |uow| {
        uow
          .execute(
            "INSERT INTO agents (matricule, name, job_function, hire_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
              input.matricule,
              input.name,
              input.job_function,
              input.hire_date.map(encode_date),
            ],
          )
          .or_conflict(|| Conflict::AgentExists(input.matricule.clone()))?;

        if let Some(domain) = &input.trainer_domain {
          uow.execute(
            "INSERT INTO trainers (matricule, domain) VALUES (?1, ?2)",
            params![input.matricule, domain],
          )?;
        }
        Ok(input.into_agent())
      })
      .await
  }

  async fn update_agent(
    &self,
    matricule: String,
    input: AgentUpdate,
  ) -> Result<Agent> {
    self
      .write(move |uow| {
        let changed = uow.execute(
          "UPDATE agents SET name = ?1, job_function = ?2, hire_date = ?3
           WHERE matricule = ?4",
          params![
            input.name,
            input.job_function,
            input.hire_date.map(encode_date),
            matricule,
          ],
        )?;
        if changed == 0 {
          return Err(not_found(Entity::Agent, &matricule));
        }

        match &input.trainer_domain {
          Some(domain) => {
            uow.execute(
              "INSERT INTO trainers (matricule, domain) VALUES (?1, ?2)
               ON CONFLICT(matricule) DO UPDATE SET domain = excluded.domain",
              params![matricule, domain],
            )?;
          }
          None => {
            let assigned = uow.exists(
              "SELECT 1 FROM sessions WHERE trainer_matricule = ?1",
              params![matricule],
            )?;
            if assigned {
              return Err(InvalidState::TrainerAssigned(matricule).into());
            }
            uow.execute(
              "DELETE FROM trainers WHERE matricule = ?1",
              params![matricule],
            )?;
          }
        }

        load_agent(uow, &matricule)?
          .ok_or_else(|| not_found(Entity::Agent, &matricule))
      })
      .await
  }

  async fn delete_agent(&self, matricule: String) -> Result<()> {
    self
      .write(move |uow| {
        cascade::AGENT.run(uow, params![matricule], &matricule)
      })
      .await
  }

  // ── Catalogues ────────────────────────────────────────────────────────────

  async fn list_catalogues(&self) -> Result<Vec<CatalogueDetail>> {
    self
      .read(|uow| {
        let catalogues = uow.query(
          &format!("{CATALOGUE_SELECT} ORDER BY name"),
          [],
          catalogue_row,
        )?;
        catalogues
          .into_iter()
          .map(|catalogue| {
            let skills = catalogue_skills_of(uow, catalogue.catalogue_id)?;
            Ok(CatalogueDetail { catalogue, skills })
          })
          .collect::<Result<Vec<_>>>()
      })
      .await
  }

  async fn get_catalogue(&self, id: i64) -> Result<Option<CatalogueDetail>> {
    self.read(move |uow| load_catalogue(uow, id)).await
  }

  async fn create_catalogue(&self, input: NewCatalogue) -> Result<CatalogueDetail> {
    self
      .write(move |uow| {
        let catalogue_id: i64 = uow.query_one(
          "INSERT INTO catalogues
             (name, description, objective, prerequisites, category)
           VALUES (?1, ?2, ?3, ?4, ?5)
           RETURNING catalogue_id",
          params![
            input.name,
            input.description,
            input.objective,
            input.prerequisites,
            encode_category(input.category),
          ],
          |row| row.get(0),
        )?;
        reconcile::link_skills(uow, catalogue_id, &input.skills)?;
        load_catalogue(uow, catalogue_id)?
          .ok_or_else(|| not_found(Entity::Catalogue, catalogue_id))
      })
      .await
  }

  async fn update_catalogue(
    &self,
    id: i64,
    input: NewCatalogue,
  ) -> Result<CatalogueDetail> {
    self
      .write(move |uow| {
        let changed = uow.execute(
          "UPDATE catalogues
           SET name = ?1, description = ?2, objective = ?3,
               prerequisites = ?4, category = ?5
           WHERE catalogue_id = ?6",
          params![
            input.name,
            input.description,
            input.objective,
            input.prerequisites,
            encode_category(input.category),
            id,
          ],
        )?;
        if changed == 0 {
          return Err(not_found(Entity::Catalogue, id));
        }
        reconcile::replace_skills(uow, id, &input.skills)?;
        load_catalogue(uow, id)?.ok_or_else(|| not_found(Entity::Catalogue, id))
      })
      .await
  }

  async fn delete_catalogue(&self, id: i64) -> Result<()> {
    self
      .write(move |uow| {
        require_catalogue(uow, id)?;
        let used = uow.exists(
          "SELECT 1 FROM sessions WHERE catalogue_id = ?1",
          params![id],
        )?;
        if used {
          return Err(InvalidState::CatalogueInUse(id).into());
        }
        cascade::CATALOGUE.run(uow, params![id], &id.to_string())
      })
      .await
  }

  async fn catalogue_skills(&self, id: i64) -> Result<Vec<Skill>> {
    self
      .read(move |uow| {
        require_catalogue(uow, id)?;
        catalogue_skills_of(uow, id)
      })
      .await
  }

  // ── Skills ────────────────────────────────────────────────────────────────

  async fn list_skills(&self) -> Result<Vec<Skill>> {
    self
      .read(|uow| {
        uow.query(
          "SELECT skill_id, description FROM skills ORDER BY description",
          [],
          skill_row,
        )
      })
      .await
  }

  async fn get_skill(&self, id: i64) -> Result<Option<Skill>> {
    self
      .read(move |uow| {
        uow.query_opt(
          "SELECT skill_id, description FROM skills WHERE skill_id = ?1",
          params![id],
          skill_row,
        )
      })
      .await
  }

  async fn create_skill(&self, description: String) -> Result<Skill> {
    self
      .write(move |uow| {
        uow
          .query_one(
            "INSERT INTO skills (description) VALUES (?1)
             RETURNING skill_id, description",
            params![description],
            skill_row,
          )
          .or_conflict(|| Conflict::SkillExists(description.clone()))
      })
      .await
  }

  async fn update_skill(&self, id: i64, description: String) -> Result<Skill> {
    self
      .write(move |uow| {
        let changed = uow
          .execute(
            "UPDATE skills SET description = ?1 WHERE skill_id = ?2",
            params![description, id],
          )
          .or_conflict(|| Conflict::SkillExists(description.clone()))?;
        if changed == 0 {
          return Err(not_found(Entity::Skill, id));
        }
        Ok(Skill { skill_id: id, description })
      })
      .await
  }

  async fn delete_skill(&self, id: i64) -> Result<()> {
    self
      .write(move |uow| {
        let sql = "SELECT 1 FROM skills WHERE skill_id = ?1";
        if !uow.exists(sql, params![id])? {
          return Err(not_found(Entity::Skill, id));
        }
        let sql = "SELECT 1 FROM catalogue_skills WHERE skill_id = ?1";
        if uow.exists(sql, params![id])? {
          return Err(InvalidState::SkillInCatalogue(id).into());
        }
        let sql = "SELECT 1 FROM evaluations WHERE skill_id = ?1";
        if uow.exists(sql, params![id])? {
          return Err(InvalidState::SkillEvaluated(id).into());
        }
        uow.execute("DELETE FROM skills WHERE skill_id = ?1", params![id])?;
        Ok(())
      })
      .await
  }

  async fn search_skills(&self, term: String) -> Result<Vec<Skill>> {
    let pattern = contains_pattern(term.trim());
    self
      .read(move |uow| {
        uow.query(
          "SELECT skill_id, description FROM skills
           WHERE description LIKE ?1 ESCAPE '\\'
           ORDER BY description",
          params![pattern],
          skill_row,
        )
      })
      .await
  }

  // ── Cabinets ──────────────────────────────────────────────────────────────

  async fn list_cabinets(&self) -> Result<Vec<CabinetSummary>> {
    self
      .read(|uow| {
        uow.query(
          "SELECT c.cabinet_id, c.name, c.phone, c.location, COUNT(s.code)
           FROM cabinets c
           LEFT JOIN sessions s ON s.cabinet_id = c.cabinet_id
           GROUP BY c.cabinet_id
           ORDER BY c.name",
          [],
          |row| {
            Ok(CabinetSummary {
              cabinet:       cabinet_row(row)?,
              session_count: row.get(4)?,
            })
          },
        )
      })
      .await
  }

  async fn get_cabinet(&self, id: i64) -> Result<Option<CabinetDetail>> {
    self
      .read(move |uow| {
        let cabinet = uow.query_opt(
          "SELECT cabinet_id, name, phone, location
           FROM cabinets WHERE cabinet_id = ?1",
          params![id],
          cabinet_row,
        )?;
        let Some(cabinet) = cabinet else {
          return Ok(None);
        };

        let sessions = uow.query(
          "SELECT s.code, s.start_date, s.end_date, s.status, c.name
           FROM sessions s
           JOIN catalogues c ON c.catalogue_id = s.catalogue_id
           WHERE s.cabinet_id = ?1
           ORDER BY s.start_date DESC, s.code DESC",
          params![id],
          |row| {
            Ok(CabinetSession {
              code:           row.get(0)?,
              start_date:     date(row, 1)?,
              end_date:       date(row, 2)?,
              status:         status(row, 3)?,
              catalogue_name: row.get(4)?,
            })
          },
        )?;
        Ok(Some(CabinetDetail { cabinet, sessions }))
      })
      .await
  }

  async fn create_cabinet(&self, input: NewCabinet) -> Result<Cabinet> {
    self
      .write(move |uow| {
        let cabinet_id: i64 = uow
          .query_one(
            "INSERT INTO cabinets (name, phone, location) VALUES (?1, ?2, ?3)
             RETURNING cabinet_id",
            params![input.name, input.phone, input.location],
            |row| row.get(0),
          )
          .or_conflict(|| Conflict::CabinetNameTaken(input.name.clone()))?;
        Ok(Cabinet {
          cabinet_id,
          name: input.name,
          phone: input.phone,
          location: input.location,
        })
      })
      .await
  }

  async fn update_cabinet(&self, id: i64, input: NewCabinet) -> Result<Cabinet> {
    self
      .write(move |uow| {
        let changed = uow
          .execute(
            "UPDATE cabinets SET name = ?1, phone = ?2, location = ?3
             WHERE cabinet_id = ?4",
            params![input.name, input.phone, input.location, id],
          )
          .or_conflict(|| Conflict::CabinetNameTaken(input.name.clone()))?;
        if changed == 0 {
          return Err(not_found(Entity::Cabinet, id));
        }
        Ok(Cabinet {
          cabinet_id: id,
          name:       input.name,
          phone:      input.phone,
          location:   input.location,
        })
      })
      .await
  }

  async fn delete_cabinet(&self, id: i64) -> Result<()> {
    self
      .write(move |uow| {
        require_cabinet(uow, id)?;
        let sql = "SELECT 1 FROM sessions WHERE cabinet_id = ?1";
        if uow.exists(sql, params![id])? {
          return Err(InvalidState::CabinetInUse(id).into());
        }
        uow.execute("DELETE FROM cabinets WHERE cabinet_id = ?1", params![id])?;
        Ok(())
      })
      .await
  }

  async fn cabinet_sessions(&self, id: i64) -> Result<Vec<SessionSummary>> {
    self
      .read(move |uow| {
        require_cabinet(uow, id)?;
        uow.query(
          &summary_sql("WHERE s.cabinet_id = ?1"),
          params![id],
          summary_row,
        )
      })
      .await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
    self
      .read(|uow| uow.query(&summary_sql(""), [], summary_row))
      .await
  }

  async fn get_session(&self, code: i64) -> Result<Option<SessionDetail>> {
    self.read(move |uow| load_session(uow, code)).await
  }

  async fn create_session(&self, input: NewSession) -> Result<SessionDetail> {
    self
      .write(move |uow| {
        let facilitator = input.facilitator()?;
        require_catalogue(uow, input.catalogue_id)?;
        require_facilitator(uow, &facilitator)?;

        let code: i64 = uow.query_one(
          "INSERT INTO sessions
             (catalogue_id, start_date, end_date, session_type, status,
              trainer_matricule, cabinet_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           RETURNING code",
          params![
            input.catalogue_id,
            encode_date(input.start_date),
            encode_date(input.end_date),
            encode_session_type(input.session_type),
            encode_status(input.status),
            facilitator.trainer(),
            facilitator.cabinet(),
          ],
          |row| row.get(0),
        )?;

        for matricule in &input.participants {
          let enrolled = uow.execute(
            "INSERT INTO participants (session_code, matricule)
             SELECT ?1, matricule FROM agents WHERE matricule = ?2
             ON CONFLICT DO NOTHING",
            params![code, matricule],
          )?;
          if enrolled == 0 {
            warn!(session = code, matricule = %matricule, "initial participant skipped");
          }
        }

        reload_session(uow, code)
      })
      .await
  }

  async fn update_session(
    &self,
    code: i64,
    input: SessionUpdate,
  ) -> Result<SessionDetail> {
    self
      .write(move |uow| {
        let facilitator = input.facilitator()?;
        require_session(uow, code)?;
        require_facilitator(uow, &facilitator)?;

        uow.execute(
          "UPDATE sessions
           SET start_date = ?1, end_date = ?2, session_type = ?3, status = ?4,
               trainer_matricule = ?5, cabinet_id = ?6
           WHERE code = ?7",
          params![
            encode_date(input.start_date),
            encode_date(input.end_date),
            encode_session_type(input.session_type),
            encode_status(input.status),
            facilitator.trainer(),
            facilitator.cabinet(),
            code,
          ],
        )?;
        reload_session(uow, code)
      })
      .await
  }

  async fn delete_session(&self, code: i64) -> Result<()> {
    self
      .write(move |uow| {
        cascade::SESSION.run(uow, params![code], &code.to_string())
      })
      .await
  }

  async fn session_participants(&self, code: i64) -> Result<Vec<Enrollee>> {
    self
      .read(move |uow| {
        require_session(uow, code)?;
        participants_of(uow, code)
      })
      .await
  }

  async fn add_participant(&self, code: i64, matricule: String) -> Result<()> {
    self
      .write(move |uow| {
        require_session(uow, code)?;
        let sql = "SELECT 1 FROM agents WHERE matricule = ?1";
        if !uow.exists(sql, params![matricule])? {
          return Err(not_found(Entity::Agent, &matricule));
        }
        uow
          .execute(
            "INSERT INTO participants (session_code, matricule) VALUES (?1, ?2)",
            params![code, matricule],
          )
          .or_conflict(|| Conflict::AlreadyEnrolled {
            matricule: matricule.clone(),
            session:   code,
          })?;
        Ok(())
      })
      .await
  }

  async fn remove_participant(&self, code: i64, matricule: String) -> Result<()> {
    self
      .write(move |uow| {
        cascade::PARTICIPANT.run(
          uow,
          params![code, matricule],
          &participant_key(code, &matricule),
        )
      })
      .await
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn record_attendance(
    &self,
    rows: Vec<AttendanceInput>,
  ) -> Result<BatchReport<AttendanceInput>> {
    if rows.is_empty() {
      return Err(CoreError::validation("attendance batch is empty").into());
    }

    self
      .write(move |uow| {
        rows
          .into_iter()
          .map(|row| -> Result<RowResult<AttendanceInput>> {
            if !is_enrolled(uow, row.session_code, &row.matricule)? {
              warn!(
                session = row.session_code,
                matricule = %row.matricule,
                "attendance for non-participant skipped"
              );
              return Ok(RowResult { row, outcome: RowOutcome::SkippedInvalid });
            }

            uow.execute(
              "INSERT INTO attendance (session_code, matricule, date, status)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(session_code, matricule, date)
               DO UPDATE SET status = excluded.status",
              params![
                row.session_code,
                row.matricule,
                encode_date(row.date),
                encode_attendance(row.status),
              ],
            )?;
            Ok(RowResult { row, outcome: RowOutcome::Applied })
          })
          .collect::<Result<BatchReport<_>>>()
      })
      .await
  }

  async fn session_attendance(
    &self,
    code: i64,
    on: Option<NaiveDate>,
  ) -> Result<Vec<AttendanceRecord>> {
    let on = on.map(encode_date);
    self
      .read(move |uow| {
        require_session(uow, code)?;
        uow.query(
          "SELECT at.session_code, at.matricule, at.date, at.status, a.name
           FROM attendance at
           JOIN agents a ON a.matricule = at.matricule
           WHERE at.session_code = ?1 AND (?2 IS NULL OR at.date = ?2)
           ORDER BY at.date DESC, a.name",
          params![code, on],
          |row| {
            Ok(AttendanceRecord {
              session_code:     row.get(0)?,
              matricule:        row.get(1)?,
              date:             date(row, 2)?,
              status:           attendance(row, 3)?,
              participant_name: row.get(4)?,
            })
          },
        )
      })
      .await
  }

  async fn training_calendar(&self, code: i64) -> Result<TrainingCalendar> {
    self
      .read(move |uow| {
        let (start, end) = uow
          .query_opt(
            "SELECT start_date, end_date FROM sessions WHERE code = ?1",
            params![code],
            |row| Ok((date(row, 0)?, date(row, 1)?)),
          )?
          .ok_or_else(|| not_found(Entity::Session, code))?;

        let recorded = uow.query(
          "SELECT DISTINCT date FROM attendance WHERE session_code = ?1",
          params![code],
          |row| date(row, 0),
        )?;
        Ok(aggregate::training_calendar(start, end, &recorded))
      })
      .await
  }

  async fn attendance_roster(
    &self,
    code: i64,
    on: NaiveDate,
  ) -> Result<Vec<RosterEntry>> {
    let on = encode_date(on);
    self
      .read(move |uow| {
        require_session(uow, code)?;
        uow.query(
          "SELECT a.matricule, a.name, a.job_function,
                  COALESCE(at.status, 'absent')
           FROM participants p
           JOIN agents a ON a.matricule = p.matricule
           LEFT JOIN attendance at
             ON  at.session_code = p.session_code
             AND at.matricule    = p.matricule
             AND at.date         = ?2
           WHERE p.session_code = ?1
           ORDER BY a.name",
          params![code, on],
          |row| {
            Ok(RosterEntry {
              matricule:    row.get(0)?,
              name:         row.get(1)?,
              job_function: row.get(2)?,
              status:       attendance(row, 3)?,
            })
          },
        )
      })
      .await
  }

  async fn attendance_summary(
    &self,
    code: i64,
    matricule: String,
  ) -> Result<AttendanceSummary> {
    self
      .read(move |uow| {
        require_participant(uow, code, &matricule)?;
        let days = uow.query(
          "SELECT date, status FROM attendance
           WHERE session_code = ?1 AND matricule = ?2
           ORDER BY date",
          params![code, matricule],
          |row| Ok(DayStatus { date: date(row, 0)?, status: attendance(row, 1)? }),
        )?;
        let summary = aggregate::attendance_stats(&days);
        Ok(AttendanceSummary { matricule, days, summary })
      })
      .await
  }

  // ── Evaluations ───────────────────────────────────────────────────────────

  async fn save_evaluations(
    &self,
    rows: Vec<EvaluationInput>,
  ) -> Result<BatchReport<EvaluationInput>> {
    if rows.is_empty() {
      return Err(CoreError::validation("evaluation batch is empty").into());
    }
    for row in &rows {
      check_score(row.score)?;
    }

    self
      .write(move |uow| {
        rows
          .into_iter()
          .map(|row| -> Result<RowResult<EvaluationInput>> {
            let enrolled = is_enrolled(uow, row.session_code, &row.matricule)?;
            let taught = uow.exists(
              "SELECT 1 FROM sessions s
               JOIN catalogue_skills cs ON cs.catalogue_id = s.catalogue_id
               WHERE s.code = ?1 AND cs.skill_id = ?2",
              params![row.session_code, row.skill_id],
            )?;
            if !(enrolled && taught) {
              warn!(
                session = row.session_code,
                matricule = %row.matricule,
                skill = row.skill_id,
                enrolled,
                taught,
                "evaluation skipped"
              );
              return Ok(RowResult { row, outcome: RowOutcome::SkippedInvalid });
            }

            uow.execute(
              "INSERT INTO evaluations (session_code, matricule, skill_id, score)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(session_code, matricule, skill_id)
               DO UPDATE SET score = excluded.score",
              params![row.session_code, row.matricule, row.skill_id, row.score],
            )?;
            Ok(RowResult { row, outcome: RowOutcome::Applied })
          })
          .collect::<Result<BatchReport<_>>>()
      })
      .await
  }

  async fn session_evaluations(&self, code: i64) -> Result<Vec<EvaluationRecord>> {
    self
      .read(move |uow| {
        require_session(uow, code)?;
        uow.query(
          "SELECT e.session_code, e.matricule, e.skill_id, e.score,
                  a.name, sk.description
           FROM evaluations e
           JOIN agents a  ON a.matricule = e.matricule
           JOIN skills sk ON sk.skill_id = e.skill_id
           WHERE e.session_code = ?1
           ORDER BY a.name, sk.description",
          params![code],
          |row| {
            Ok(EvaluationRecord {
              session_code:     row.get(0)?,
              matricule:        row.get(1)?,
              skill_id:         row.get(2)?,
              score:            row.get(3)?,
              participant_name: row.get(4)?,
              skill:            row.get(5)?,
            })
          },
        )
      })
      .await
  }

  async fn session_skills(&self, code: i64) -> Result<Vec<Skill>> {
    self
      .read(move |uow| {
        require_session(uow, code)?;
        session_skills_of(uow, code)
      })
      .await
  }

  async fn evaluation_matrix(&self, code: i64) -> Result<EvaluationMatrix> {
    self
      .read(move |uow| {
        require_session(uow, code)?;
        let participants = participants_of(uow, code)?;
        let skills = session_skills_of(uow, code)?;
        let scores = uow.query(
          "SELECT matricule, skill_id, score FROM evaluations
           WHERE session_code = ?1",
          params![code],
          |row| {
            Ok(ScoreRow {
              matricule: row.get(0)?,
              skill_id:  row.get(1)?,
              score:     row.get(2)?,
            })
          },
        )?;
        Ok(aggregate::evaluation_matrix(code, participants, skills, &scores))
      })
      .await
  }

  async fn evaluation_summary(
    &self,
    code: i64,
    matricule: String,
  ) -> Result<EvaluationSummary> {
    self
      .read(move |uow| {
        require_participant(uow, code, &matricule)?;

        let participant = uow.query_one(
          "SELECT a.matricule, a.name, a.job_function,
                  c.name, c.category, s.start_date, s.end_date
           FROM participants p
           JOIN agents a     ON a.matricule    = p.matricule
           JOIN sessions s   ON s.code         = p.session_code
           JOIN catalogues c ON c.catalogue_id = s.catalogue_id
           WHERE p.session_code = ?1 AND p.matricule = ?2",
          params![code, matricule],
          |row| {
            Ok(ParticipantInfo {
              matricule:          row.get(0)?,
              name:               row.get(1)?,
              job_function:       row.get(2)?,
              catalogue_name:     row.get(3)?,
              catalogue_category: category(row, 4)?,
              start_date:         date(row, 5)?,
              end_date:           date(row, 6)?,
            })
          },
        )?;

        let evaluations = uow.query(
          "SELECT sk.description, e.score
           FROM evaluations e
           JOIN skills sk ON sk.skill_id = e.skill_id
           WHERE e.session_code = ?1 AND e.matricule = ?2
           ORDER BY sk.description",
          params![code, matricule],
          |row| Ok(SkillScore { skill: row.get(0)?, score: row.get(1)? }),
        )?;

        let scores: Vec<f64> = evaluations.iter().map(|e| e.score).collect();
        Ok(EvaluationSummary {
          participant,
          evaluations,
          summary: aggregate::evaluation_stats(&scores),
        })
      })
      .await
  }

  async fn participant_evaluations(
    &self,
    matricule: String,
    session: Option<i64>,
  ) -> Result<Vec<ParticipantEvaluation>> {
    self
      .read(move |uow| {
        let sql = "SELECT 1 FROM agents WHERE matricule = ?1";
        if !uow.exists(sql, params![matricule])? {
          return Err(not_found(Entity::Agent, &matricule));
        }
        uow.query(
          "SELECT e.session_code, e.skill_id, sk.description, e.score,
                  s.start_date, s.end_date, c.name
           FROM evaluations e
           JOIN skills sk    ON sk.skill_id    = e.skill_id
           JOIN sessions s   ON s.code         = e.session_code
           JOIN catalogues c ON c.catalogue_id = s.catalogue_id
           WHERE e.matricule = ?1 AND (?2 IS NULL OR e.session_code = ?2)
           ORDER BY s.start_date DESC, sk.description",
          params![matricule, session],
          |row| {
            Ok(ParticipantEvaluation {
              session_code:   row.get(0)?,
              skill_id:       row.get(1)?,
              skill:          row.get(2)?,
              score:          row.get(3)?,
              start_date:     date(row, 4)?,
              end_date:       date(row, 5)?,
              catalogue_name: row.get(6)?,
            })
          },
        )
      })
      .await
  }
}
