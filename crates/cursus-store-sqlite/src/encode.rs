//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` strings and enums as their snake_case
//! names. Decoders read straight from a [`Row`] so they can be used inside
//! `query_map` closures; a malformed column surfaces as a conversion failure.

use chrono::NaiveDate;
use cursus_core::{
  attendance::AttendanceStatus,
  catalogue::Category,
  session::{SessionStatus, SessionType},
};
use rusqlite::{Row, types::Type};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownValue {
  kind:  &'static str,
  value: String,
}

fn conversion_failure(
  idx: usize,
  err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn text<T>(
  row: &Row<'_>,
  idx: usize,
  decode: impl FnOnce(&str) -> Option<T>,
  kind: &'static str,
) -> rusqlite::Result<T> {
  let raw: String = row.get(idx)?;
  decode(&raw)
    .ok_or_else(|| conversion_failure(idx, UnknownValue { kind, value: raw }))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
  let raw: String = row.get(idx)?;
  NaiveDate::parse_from_str(&raw, DATE_FORMAT)
    .map_err(|e| conversion_failure(idx, e))
}

pub fn opt_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
  let raw: Option<String> = row.get(idx)?;
  raw
    .map(|s| {
      NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .map_err(|e| conversion_failure(idx, e))
    })
    .transpose()
}

// ─── Category ────────────────────────────────────────────────────────────────

pub fn encode_category(c: Category) -> &'static str {
  match c {
    Category::Certifying => "certifying",
    Category::NonCertifying => "non_certifying",
  }
}

pub fn category(row: &Row<'_>, idx: usize) -> rusqlite::Result<Category> {
  text(
    row,
    idx,
    |s| match s {
      "certifying" => Some(Category::Certifying),
      "non_certifying" => Some(Category::NonCertifying),
      _ => None,
    },
    "category",
  )
}

// ─── SessionType / SessionStatus ─────────────────────────────────────────────

pub fn encode_session_type(t: SessionType) -> &'static str {
  match t {
    SessionType::Internal => "internal",
    SessionType::External => "external",
  }
}

pub fn session_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<SessionType> {
  text(
    row,
    idx,
    |s| match s {
      "internal" => Some(SessionType::Internal),
      "external" => Some(SessionType::External),
      _ => None,
    },
    "session type",
  )
}

pub fn encode_status(s: SessionStatus) -> &'static str {
  match s {
    SessionStatus::InProgress => "in_progress",
    SessionStatus::Finished => "finished",
  }
}

pub fn status(row: &Row<'_>, idx: usize) -> rusqlite::Result<SessionStatus> {
  text(
    row,
    idx,
    |s| match s {
      "in_progress" => Some(SessionStatus::InProgress),
      "finished" => Some(SessionStatus::Finished),
      _ => None,
    },
    "session status",
  )
}

// ─── AttendanceStatus ────────────────────────────────────────────────────────

pub fn encode_attendance(s: AttendanceStatus) -> &'static str {
  match s {
    AttendanceStatus::Present => "present",
    AttendanceStatus::Absent => "absent",
  }
}

pub fn attendance(
  row: &Row<'_>,
  idx: usize,
) -> rusqlite::Result<AttendanceStatus> {
  text(
    row,
    idx,
    |s| match s {
      "present" => Some(AttendanceStatus::Present),
      "absent" => Some(AttendanceStatus::Absent),
      _ => None,
    },
    "attendance status",
  )
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// A `LIKE ... ESCAPE '\'` pattern matching `term` anywhere in the value.
pub fn contains_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for ch in term.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
  out.push('%');
  out
}
