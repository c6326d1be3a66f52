//! Field-level request validation, applied before anything reaches the
//! store.

use chrono::NaiveDate;
use cursus_core::evaluation::{MAX_SCORE, MIN_SCORE};

use crate::error::ApiError;

/// Shortest accepted skill search term, in characters.
pub const MIN_SEARCH_LEN: usize = 2;

/// `value` must contain something other than whitespace.
pub fn required(field: &str, value: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::bad_request(format!("{field} is required")));
  }
  Ok(())
}

/// Like [`required`], for optional fields that must not be blank when given.
pub fn not_blank(field: &str, value: Option<&str>) -> Result<(), ApiError> {
  match value {
    Some(v) => required(field, v),
    None => Ok(()),
  }
}

pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
  if end < start {
    return Err(ApiError::bad_request(format!(
      "end_date {end} precedes start_date {start}"
    )));
  }
  Ok(())
}

pub fn score(value: f64) -> Result<(), ApiError> {
  if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
    return Err(ApiError::bad_request(format!(
      "score must be between {MIN_SCORE} and {MAX_SCORE}, got {value}"
    )));
  }
  Ok(())
}

pub fn non_empty<T>(field: &str, rows: &[T]) -> Result<(), ApiError> {
  if rows.is_empty() {
    return Err(ApiError::bad_request(format!(
      "{field} must be a non-empty array"
    )));
  }
  Ok(())
}

/// The trimmed search term, or an error when it is missing or too short.
pub fn search_term(term: Option<&str>) -> Result<String, ApiError> {
  let term = term.map(str::trim).unwrap_or_default();
  if term.chars().count() < MIN_SEARCH_LEN {
    return Err(ApiError::bad_request(format!(
      "search term must be at least {MIN_SEARCH_LEN} characters"
    )));
  }
  Ok(term.to_owned())
}
