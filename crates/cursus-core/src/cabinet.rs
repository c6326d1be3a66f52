//! Cabinets — external training providers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::session::SessionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cabinet {
  pub cabinet_id: i64,
  /// Unique across cabinets.
  pub name:       String,
  pub phone:      Option<String>,
  pub location:   Option<String>,
}

/// Listing row: a cabinet with the number of sessions it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetSummary {
  #[serde(flatten)]
  pub cabinet:       Cabinet,
  pub session_count: i64,
}

/// A session as seen from its cabinet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetSession {
  pub code:           i64,
  pub start_date:     NaiveDate,
  pub end_date:       NaiveDate,
  pub status:         SessionStatus,
  pub catalogue_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetDetail {
  #[serde(flatten)]
  pub cabinet:  Cabinet,
  pub sessions: Vec<CabinetSession>,
}

/// Input to cabinet create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCabinet {
  pub name:     String,
  pub phone:    Option<String>,
  pub location: Option<String>,
}
