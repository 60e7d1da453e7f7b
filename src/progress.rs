//! Progress derived from a session's exercise history: practice-day streaks
//! and badges.
//!
//! Everything here is a pure function of the records plus the current time,
//! so callers (and tests) pin the clock.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ExerciseRecord, Topic};

/// Correct answers in one topic that earn its badge.
pub const TOPIC_MASTERY: usize = 20;
/// Most recent exercises that must all be correct for `Flawless`.
pub const FLAWLESS_RUN: usize = 10;
/// Correct answers overall that earn `Century`.
pub const CENTURY: usize = 100;
/// Distinct practice days within the last week that earn `WeeklyStreak`.
pub const WEEKLY_DAYS: usize = 7;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
  FirstSteps,
  AdditionMaster,
  SubtractionMaster,
  Multiplier,
  Divider,
  Rounder,
  Flawless,
  WeeklyStreak,
  Century,
}

impl BadgeType {
  pub const ALL: [BadgeType; 9] = [
    BadgeType::FirstSteps,
    BadgeType::AdditionMaster,
    BadgeType::SubtractionMaster,
    BadgeType::Multiplier,
    BadgeType::Divider,
    BadgeType::Rounder,
    BadgeType::Flawless,
    BadgeType::WeeklyStreak,
    BadgeType::Century,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      BadgeType::FirstSteps => "first_steps",
      BadgeType::AdditionMaster => "addition_master",
      BadgeType::SubtractionMaster => "subtraction_master",
      BadgeType::Multiplier => "multiplier",
      BadgeType::Divider => "divider",
      BadgeType::Rounder => "rounder",
      BadgeType::Flawless => "flawless",
      BadgeType::WeeklyStreak => "weekly_streak",
      BadgeType::Century => "century",
    }
  }

  /// The topic a mastery badge belongs to.
  pub fn topic(self) -> Option<Topic> {
    match self {
      BadgeType::AdditionMaster => Some(Topic::Addition),
      BadgeType::SubtractionMaster => Some(Topic::Subtraction),
      BadgeType::Multiplier => Some(Topic::Multiplication),
      BadgeType::Divider => Some(Topic::Division),
      BadgeType::Rounder => Some(Topic::Rounding),
      _ => None,
    }
  }
}

impl fmt::Display for BadgeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A badge held by a session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
  pub badge_type: BadgeType,
  pub earned_at: DateTime<Utc>,
}

/// Distinct UTC days with at least one exercise in the seven days up to `now`.
pub fn days_practiced_this_week(records: &[ExerciseRecord], now: DateTime<Utc>) -> usize {
  let week_ago = now - Duration::days(7);
  records
    .iter()
    .filter(|r| r.created_at >= week_ago)
    .map(|r| r.created_at.date_naive())
    .collect::<BTreeSet<NaiveDate>>()
    .len()
}

/// Consecutive practice days ending today, or yesterday if today has no
/// exercise yet. Days after `today` are ignored.
pub fn current_streak(records: &[ExerciseRecord], today: NaiveDate) -> usize {
  let days: BTreeSet<NaiveDate> = records
    .iter()
    .map(|r| r.created_at.date_naive())
    .filter(|d| *d <= today)
    .collect();

  let mut expected = if days.contains(&today) {
    today
  } else {
    match today.pred_opt() {
      Some(yesterday) if days.contains(&yesterday) => yesterday,
      _ => return 0,
    }
  };

  let mut streak = 0;
  for day in days.into_iter().rev() {
    if day != expected {
      break;
    }
    streak += 1;
    match expected.pred_opt() {
      Some(prev) => expected = prev,
      None => break,
    }
  }
  streak
}

/// Badges the history (oldest first) qualifies for that are not in `held`,
/// in `BadgeType::ALL` order.
pub fn award_badges(records: &[ExerciseRecord], held: &BTreeSet<BadgeType>, now: DateTime<Utc>) -> Vec<BadgeType> {
  let correct_in = |topic: Option<Topic>| {
    records
      .iter()
      .filter(|r| r.is_correct && topic.map_or(true, |t| r.topic == t))
      .count()
  };

  let qualifies = |badge: BadgeType| match badge {
    BadgeType::FirstSteps => !records.is_empty(),
    BadgeType::Flawless => {
      records.len() >= FLAWLESS_RUN && records[records.len() - FLAWLESS_RUN..].iter().all(|r| r.is_correct)
    }
    BadgeType::Century => correct_in(None) >= CENTURY,
    BadgeType::WeeklyStreak => days_practiced_this_week(records, now) >= WEEKLY_DAYS,
    mastery => mastery.topic().is_some_and(|t| correct_in(Some(t)) >= TOPIC_MASTERY),
  };

  BadgeType::ALL
    .into_iter()
    .filter(|b| !held.contains(b))
    .filter(|b| qualifies(*b))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, GeneratedProblem, Notation, Operator};
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 18, 15, 0, 0).unwrap()
  }

  fn record(topic: Topic, is_correct: bool, created_at: DateTime<Utc>) -> ExerciseRecord {
    let p = GeneratedProblem::new(41, 38, Operator::Plus, Notation::Inline).unwrap();
    ExerciseRecord {
      id: "r".into(),
      session_id: "s".into(),
      topic,
      difficulty: Difficulty::MIN,
      problem: p.data(),
      user_answer: "79".into(),
      correct_answer: 79,
      is_correct,
      error_type: None,
      time_spent_seconds: 4,
      created_at,
    }
  }

  fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
  }

  fn award(records: &[ExerciseRecord]) -> Vec<BadgeType> {
    award_badges(records, &BTreeSet::new(), now())
  }

  #[test]
  fn empty_history_earns_nothing() {
    assert!(award(&[]).is_empty());
    assert_eq!(current_streak(&[], now().date_naive()), 0);
    assert_eq!(days_practiced_this_week(&[], now()), 0);
  }

  #[test]
  fn first_exercise_earns_first_steps_even_when_wrong() {
    let records = vec![record(Topic::Division, false, now())];
    assert_eq!(award(&records), vec![BadgeType::FirstSteps]);
  }

  #[test]
  fn topic_badge_needs_twenty_correct_in_that_topic() {
    let mut records: Vec<_> = (0..19).map(|_| record(Topic::Rounding, true, now())).collect();
    records.push(record(Topic::Rounding, false, now()));
    records.push(record(Topic::Addition, true, now()));
    assert!(!award(&records).contains(&BadgeType::Rounder));

    records.push(record(Topic::Rounding, true, now()));
    let earned = award(&records);
    assert!(earned.contains(&BadgeType::Rounder));
    assert!(!earned.contains(&BadgeType::AdditionMaster));
  }

  #[test]
  fn flawless_looks_at_the_last_ten_only() {
    let mut records = vec![record(Topic::Addition, false, now())];
    records.extend((0..9).map(|_| record(Topic::Addition, true, now())));
    assert!(!award(&records).contains(&BadgeType::Flawless));

    records.push(record(Topic::Addition, true, now()));
    assert!(award(&records).contains(&BadgeType::Flawless));

    records.push(record(Topic::Addition, false, now()));
    assert!(!award(&records).contains(&BadgeType::Flawless));
  }

  #[test]
  fn century_counts_correct_answers_across_topics() {
    let mut records: Vec<_> = Topic::ALL
      .into_iter()
      .cycle()
      .take(99)
      .map(|t| record(t, true, now()))
      .collect();
    records.push(record(Topic::Addition, false, now()));
    assert!(!award(&records).contains(&BadgeType::Century));

    records.push(record(Topic::Subtraction, true, now()));
    assert!(award(&records).contains(&BadgeType::Century));
  }

  #[test]
  fn weekly_streak_needs_seven_distinct_days() {
    let mut records: Vec<_> = (0..6).map(|d| record(Topic::Addition, true, days_ago(d))).collect();
    records.push(record(Topic::Addition, true, days_ago(2)));
    assert_eq!(days_practiced_this_week(&records, now()), 6);
    assert!(!award(&records).contains(&BadgeType::WeeklyStreak));

    records.push(record(Topic::Addition, true, days_ago(6)));
    assert!(award(&records).contains(&BadgeType::WeeklyStreak));
  }

  #[test]
  fn held_badges_are_not_awarded_again() {
    let records: Vec<_> = (0..20).map(|_| record(Topic::Addition, true, now())).collect();
    assert_eq!(
      award(&records),
      vec![BadgeType::FirstSteps, BadgeType::AdditionMaster, BadgeType::Flawless]
    );

    let held: BTreeSet<_> = [BadgeType::FirstSteps, BadgeType::Flawless].into_iter().collect();
    assert_eq!(award_badges(&records, &held, now()), vec![BadgeType::AdditionMaster]);

    let held: BTreeSet<_> = award(&records).into_iter().collect();
    assert!(award_badges(&records, &held, now()).is_empty());
  }

  #[test]
  fn streak_counts_back_from_today() {
    let records: Vec<_> = [0, 1, 1, 2].iter().map(|&d| record(Topic::Addition, true, days_ago(d))).collect();
    assert_eq!(current_streak(&records, now().date_naive()), 3);
  }

  #[test]
  fn streak_may_end_yesterday() {
    let records: Vec<_> = [1, 2, 3].iter().map(|&d| record(Topic::Addition, true, days_ago(d))).collect();
    assert_eq!(current_streak(&records, now().date_naive()), 3);
  }

  #[test]
  fn gap_day_breaks_the_streak() {
    let records: Vec<_> = [0, 1, 3, 4, 5].iter().map(|&d| record(Topic::Addition, true, days_ago(d))).collect();
    assert_eq!(current_streak(&records, now().date_naive()), 2);

    let stale: Vec<_> = [2, 3].iter().map(|&d| record(Topic::Addition, true, days_ago(d))).collect();
    assert_eq!(current_streak(&stale, now().date_naive()), 0);
  }

  #[test]
  fn future_days_do_not_count() {
    let records = vec![
      record(Topic::Addition, true, days_ago(-1)),
      record(Topic::Addition, true, days_ago(0)),
    ];
    assert_eq!(current_streak(&records, now().date_naive()), 1);
  }

  #[test]
  fn badge_serializes_snake_case() {
    let b = Badge { badge_type: BadgeType::WeeklyStreak, earned_at: now() };
    let v = serde_json::to_value(&b).unwrap();
    assert_eq!(v["badgeType"], "weekly_streak");
    assert!(v["earnedAt"].as_str().is_some());
  }
}
