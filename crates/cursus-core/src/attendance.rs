//! Daily attendance of participants.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
  Present,
  Absent,
}

/// One row of the batch accepted by
/// [`crate::store::TrainingStore::record_attendance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceInput {
  pub session_code: i64,
  pub matricule:    String,
  pub date:         NaiveDate,
  pub status:       AttendanceStatus,
}

/// A stored attendance row with the participant's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub session_code:     i64,
  pub matricule:        String,
  pub date:             NaiveDate,
  pub status:           AttendanceStatus,
  pub participant_name: String,
}

/// A training day and whether any attendance has been taken for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingDay {
  pub date:           NaiveDate,
  pub has_attendance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCalendar {
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub days:       Vec<TrainingDay>,
}

/// A participant's status on a given day. Participants with nothing recorded
/// are reported absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
  pub matricule:    String,
  pub name:         String,
  pub job_function: Option<String>,
  pub status:       AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
  pub date:   NaiveDate,
  pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceStats {
  pub total_days:      usize,
  pub present_days:    usize,
  pub absent_days:     usize,
  /// Percentage of present days, two decimals; `0` when nothing is recorded.
  pub attendance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
  pub matricule: String,
  pub days:      Vec<DayStatus>,
  pub summary:   AttendanceStats,
}
