//! SQL schema for the Cursus SQLite store.
//!
//! Executed once at connection startup. Uniqueness rules are real constraints
//! so that upserts can rely on `ON CONFLICT` instead of read-then-write.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS agents (
    matricule    TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    job_function TEXT,
    hire_date    TEXT                -- YYYY-MM-DD
);

-- Trainer extension of an agent.
CREATE TABLE IF NOT EXISTS trainers (
    matricule TEXT PRIMARY KEY REFERENCES agents(matricule),
    domain    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS catalogues (
    catalogue_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    description   TEXT,
    objective     TEXT,
    prerequisites TEXT,
    category      TEXT NOT NULL CHECK (category IN ('certifying', 'non_certifying'))
);

CREATE TABLE IF NOT EXISTS skills (
    skill_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS catalogue_skills (
    catalogue_id INTEGER NOT NULL REFERENCES catalogues(catalogue_id),
    skill_id     INTEGER NOT NULL REFERENCES skills(skill_id),
    PRIMARY KEY (catalogue_id, skill_id)
);

CREATE TABLE IF NOT EXISTS cabinets (
    cabinet_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL UNIQUE,
    phone      TEXT,
    location   TEXT
);

-- An internal session never has a cabinet; its trainer may be cleared when
-- the trainer's agent is deleted. An external session always has a cabinet
-- and never a trainer.
CREATE TABLE IF NOT EXISTS sessions (
    code              INTEGER PRIMARY KEY AUTOINCREMENT,
    catalogue_id      INTEGER NOT NULL REFERENCES catalogues(catalogue_id),
    start_date        TEXT NOT NULL,
    end_date          TEXT NOT NULL,
    session_type      TEXT NOT NULL CHECK (session_type IN ('internal', 'external')),
    status            TEXT NOT NULL DEFAULT 'in_progress'
                      CHECK (status IN ('in_progress', 'finished')),
    trainer_matricule TEXT REFERENCES trainers(matricule),
    cabinet_id        INTEGER REFERENCES cabinets(cabinet_id),
    CHECK (
      (session_type = 'internal' AND cabinet_id IS NULL) OR
      (session_type = 'external' AND trainer_matricule IS NULL AND cabinet_id IS NOT NULL)
    )
);

CREATE TABLE IF NOT EXISTS participants (
    session_code INTEGER NOT NULL REFERENCES sessions(code),
    matricule    TEXT NOT NULL REFERENCES agents(matricule),
    PRIMARY KEY (session_code, matricule)
);

CREATE TABLE IF NOT EXISTS attendance (
    session_code INTEGER NOT NULL,
    matricule    TEXT NOT NULL,
    date         TEXT NOT NULL,
    status       TEXT NOT NULL CHECK (status IN ('present', 'absent')),
    PRIMARY KEY (session_code, matricule, date),
    FOREIGN KEY (session_code, matricule)
      REFERENCES participants(session_code, matricule)
);

CREATE TABLE IF NOT EXISTS evaluations (
    session_code INTEGER NOT NULL,
    matricule    TEXT NOT NULL,
    skill_id     INTEGER NOT NULL REFERENCES skills(skill_id),
    score        REAL NOT NULL CHECK (score BETWEEN 0 AND 20),
    PRIMARY KEY (session_code, matricule, skill_id),
    FOREIGN KEY (session_code, matricule)
      REFERENCES participants(session_code, matricule)
);

CREATE INDEX IF NOT EXISTS sessions_catalogue_idx ON sessions(catalogue_id);
CREATE INDEX IF NOT EXISTS sessions_cabinet_idx   ON sessions(cabinet_id);
CREATE INDEX IF NOT EXISTS sessions_trainer_idx   ON sessions(trainer_matricule);
CREATE INDEX IF NOT EXISTS participants_agent_idx ON participants(matricule);
CREATE INDEX IF NOT EXISTS evaluations_skill_idx  ON evaluations(skill_id);

PRAGMA user_version = 1;
";
