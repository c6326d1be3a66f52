//! Read-side aggregation over rows already fetched from the store.
//!
//! Nothing here touches storage: backends run their queries and hand the flat
//! results to these builders, which keeps the arithmetic testable on its own.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::{
  attendance::{
    AttendanceStats, AttendanceStatus, DayStatus, TrainingCalendar, TrainingDay,
  },
  catalogue::Skill,
  evaluation::{
    ADMISSION_THRESHOLD, EvaluationMatrix, EvaluationStats, MatrixCell,
    MatrixRow, ScoreRow,
  },
  session::Enrollee,
};

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// Mean of `scores` rounded to two decimals, `None` for an empty slice.
pub fn average(scores: &[f64]) -> Option<f64> {
  if scores.is_empty() {
    return None;
  }
  Some(round2(scores.iter().sum::<f64>() / scores.len() as f64))
}

/// The rounded average and the admission verdict derived from it. A
/// participant without any score has neither.
pub fn admission(scores: &[f64]) -> (Option<f64>, Option<bool>) {
  let avg = average(scores);
  (avg, avg.map(|a| a >= ADMISSION_THRESHOLD))
}

pub fn evaluation_stats(scores: &[f64]) -> EvaluationStats {
  let (average_score, admitted) = admission(scores);
  EvaluationStats {
    total_skills: scores.len(),
    average_score,
    admitted,
    admission_threshold: ADMISSION_THRESHOLD,
  }
}

// ─── Matrix ──────────────────────────────────────────────────────────────────

/// Cross every participant with every skill, filling in recorded scores.
///
/// Rows follow the order of `participants`, cells the order of `skills`.
/// Scores for skills outside `skills` are ignored.
pub fn evaluation_matrix(
  session_code: i64,
  participants: Vec<Enrollee>,
  skills: Vec<Skill>,
  scores: &[ScoreRow],
) -> EvaluationMatrix {
  let recorded: HashMap<(&str, i64), f64> = scores
    .iter()
    .map(|r| ((r.matricule.as_str(), r.skill_id), r.score))
    .collect();

  let rows = participants
    .into_iter()
    .map(|p| {
      let cells: Vec<MatrixCell> = skills
        .iter()
        .map(|s| MatrixCell {
          skill_id: s.skill_id,
          skill:    s.description.clone(),
          score:    recorded.get(&(p.matricule.as_str(), s.skill_id)).copied(),
        })
        .collect();

      let present: Vec<f64> = cells.iter().filter_map(|c| c.score).collect();
      let (average, admitted) = admission(&present);

      MatrixRow {
        matricule: p.matricule,
        name: p.name,
        scores: cells,
        average,
        admitted,
      }
    })
    .collect();

  EvaluationMatrix { session_code, skills, participants: rows }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

pub fn attendance_stats(days: &[DayStatus]) -> AttendanceStats {
  let total_days = days.len();
  let present_days = days
    .iter()
    .filter(|d| d.status == AttendanceStatus::Present)
    .count();
  let absent_days = total_days - present_days;

  let attendance_rate = if total_days == 0 {
    0.0
  } else {
    round2(present_days as f64 / total_days as f64 * 100.0)
  };

  AttendanceStats { total_days, present_days, absent_days, attendance_rate }
}

/// Weekdays from `start` to `end`, both inclusive. Empty when `end` precedes
/// `start`.
pub fn training_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
  start
    .iter_days()
    .take_while(|d| *d <= end)
    .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
    .collect()
}

/// The session's training days, each flagged when attendance has already
/// been recorded for it.
pub fn training_calendar(
  start: NaiveDate,
  end: NaiveDate,
  recorded: &[NaiveDate],
) -> TrainingCalendar {
  let days = training_days(start, end)
    .into_iter()
    .map(|date| TrainingDay { date, has_attendance: recorded.contains(&date) })
    .collect();
  TrainingCalendar { start_date: start, end_date: end, days }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn enrollee(matricule: &str) -> Enrollee {
    Enrollee {
      matricule:    matricule.into(),
      name:         format!("Agent {matricule}"),
      job_function: None,
      hire_date:    None,
    }
  }

  fn skill(id: i64) -> Skill {
    Skill { skill_id: id, description: format!("skill {id}") }
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn matrix_with_a_single_score() {
    let scores = vec![ScoreRow { matricule: "P1".into(), skill_id: 1, score: 15.0 }];
    let m = evaluation_matrix(
      7,
      vec![enrollee("P1"), enrollee("P2")],
      vec![skill(1), skill(2)],
      &scores,
    );

    assert_eq!(m.session_code, 7);
    assert_eq!(m.participants.len(), 2);

    let p1 = &m.participants[0];
    assert_eq!(p1.scores[0].score, Some(15.0));
    assert_eq!(p1.scores[1].score, None);
    assert_eq!(p1.average, Some(15.0));
    assert_eq!(p1.admitted, Some(true));

    let p2 = &m.participants[1];
    assert!(p2.scores.iter().all(|c| c.score.is_none()));
    assert_eq!(p2.average, None);
    assert_eq!(p2.admitted, None);
  }

  #[test]
  fn matrix_ignores_scores_for_foreign_skills() {
    let scores = vec![
      ScoreRow { matricule: "P1".into(), skill_id: 1, score: 8.0 },
      ScoreRow { matricule: "P1".into(), skill_id: 99, score: 20.0 },
    ];
    let m = evaluation_matrix(1, vec![enrollee("P1")], vec![skill(1)], &scores);
    assert_eq!(m.participants[0].average, Some(8.0));
    assert_eq!(m.participants[0].admitted, Some(false));
  }

  #[test]
  fn admission_threshold_is_inclusive() {
    assert_eq!(admission(&[10.0]), (Some(10.0), Some(true)));
    assert_eq!(admission(&[9.99]), (Some(9.99), Some(false)));
    assert_eq!(admission(&[]), (None, None));
  }

  #[test]
  fn average_rounds_to_two_decimals() {
    assert_eq!(average(&[10.0, 11.0, 11.0]), Some(10.67));
  }

  #[test]
  fn attendance_rate_three_of_five() {
    let days: Vec<DayStatus> = [true, true, false, true, false]
      .iter()
      .enumerate()
      .map(|(i, present)| DayStatus {
        date:   date(2024, 3, 4 + i as u32),
        status: if *present {
          AttendanceStatus::Present
        } else {
          AttendanceStatus::Absent
        },
      })
      .collect();

    let stats = attendance_stats(&days);
    assert_eq!(stats.total_days, 5);
    assert_eq!(stats.present_days, 3);
    assert_eq!(stats.absent_days, 2);
    assert_eq!(stats.attendance_rate, 60.0);
  }

  #[test]
  fn attendance_rate_is_zero_without_records() {
    assert_eq!(attendance_stats(&[]).attendance_rate, 0.0);
  }

  #[test]
  fn training_days_skip_weekends() {
    // 2024-03-08 is a Friday, 2024-03-11 the following Monday.
    let days = training_days(date(2024, 3, 8), date(2024, 3, 11));
    assert_eq!(days, vec![date(2024, 3, 8), date(2024, 3, 11)]);
  }

  #[test]
  fn training_days_empty_for_inverted_range() {
    assert!(training_days(date(2024, 3, 11), date(2024, 3, 8)).is_empty());
  }

  #[test]
  fn calendar_flags_recorded_days() {
    let cal = training_calendar(
      date(2024, 3, 4),
      date(2024, 3, 6),
      &[date(2024, 3, 5)],
    );
    let flags: Vec<bool> = cal.days.iter().map(|d| d.has_attendance).collect();
    assert_eq!(flags, vec![false, true, false]);
  }
}
