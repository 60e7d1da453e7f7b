//! Practice flow shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Issuing problems (explicit difficulty, or the session's adaptive level)
//!   - Grading answers, diagnosing wrong ones and persisting the exercise
//!   - Revealing solutions
//!   - Badges, practice-day streaks and per-session statistics

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::classifier::classify;
use crate::domain::{Difficulty, ErrorType, ExerciseRecord, Topic, TopicStats};
use crate::error::{Result, TutorError};
use crate::feedback::{praise, wrong_answer_message};
use crate::generator::generate;
use crate::progress::{current_streak, days_practiced_this_week, Badge};
use crate::protocol::{to_out, AnswerOut, ProblemOut, SolutionOut, StatsOut};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Session used when an HTTP caller does not name one (single local profile).
pub const DEFAULT_SESSION: &str = "default";

/// How many error labels the per-topic stats list.
const COMMON_ERRORS: usize = 3;

#[instrument(level = "info", skip(state), fields(%session_id, %topic))]
pub async fn new_problem(
  state: &AppState,
  session_id: &str,
  topic: &str,
  difficulty: Option<i64>,
) -> Result<ProblemOut> {
  let topic: Topic = topic.parse()?;
  let difficulty = match difficulty {
    Some(d) => Difficulty::try_from(d)?,
    None => state.suggested_difficulty(session_id, topic).await,
  };
  let problem = generate(&mut rand::thread_rng(), topic, difficulty);
  let id = state.issue_problem(session_id, difficulty, problem.clone()).await;
  info!(target: "practice", %id, %topic, %difficulty, problem = %problem, "Problem served");
  Ok(to_out(&id, difficulty, &problem))
}

/// Parse what the child typed. Anything that is not a whole number means
/// "nothing submitted" and never reaches the classifier.
pub fn parse_answer(raw: &str) -> Result<i64> {
  raw.trim().parse::<i64>().map_err(|_| TutorError::NoAnswer(trunc_for_log(raw.trim(), 32)))
}

#[instrument(level = "info", skip(state, raw_answer), fields(%problem_id, answer_len = raw_answer.len()))]
pub async fn submit_answer(state: &AppState, problem_id: &str, raw_answer: &str) -> Result<AnswerOut> {
  let answer = parse_answer(raw_answer)?;

  let now = Utc::now();
  // The lock is held across the save: a failed write leaves the problem and
  // its attempt count untouched, and concurrent submissions grade in turn.
  let (issued, error_type, wrong_attempts) = {
    let mut problems = state.problems.write().await;
    let issued = problems
      .get(problem_id)
      .cloned()
      .ok_or_else(|| TutorError::UnknownProblem(problem_id.to_string()))?;
    let error_type = classify(&issued.problem, answer);
    let wrong_attempts = issued.wrong_attempts + u32::from(error_type.is_some());

    let record = ExerciseRecord {
      id: Uuid::new_v4().to_string(),
      session_id: issued.session_id.clone(),
      topic: issued.problem.topic(),
      difficulty: issued.difficulty,
      problem: issued.problem.data(),
      user_answer: raw_answer.trim().to_string(),
      correct_answer: issued.problem.correct_answer(),
      is_correct: error_type.is_none(),
      error_type,
      time_spent_seconds: issued.issued_at.elapsed().as_secs(),
      created_at: now,
    };
    state.exercises.save(record).await?;

    if error_type.is_none() {
      problems.remove(problem_id);
    } else if let Some(open) = problems.get_mut(problem_id) {
      open.wrong_attempts = wrong_attempts;
    }
    (issued, error_type, wrong_attempts)
  };

  let correct = error_type.is_none();
  let problem = &issued.problem;

  let history = state.exercises.for_session(&issued.session_id).await?;
  let new_badges = state.grant_badges(&issued.session_id, &history, now).await;

  let next_difficulty = state
    .record_result(&issued.session_id, problem.topic(), correct, wrong_attempts)
    .await;

  let feedback = if correct {
    praise(&mut rand::thread_rng()).to_string()
  } else {
    wrong_answer_message(error_type)
  };

  info!(
    target: "practice",
    %problem_id,
    %correct,
    error_type = error_type.map(ErrorType::as_str).unwrap_or("-"),
    wrong_attempts,
    new_badges = new_badges.len(),
    "Answer graded"
  );

  Ok(AnswerOut {
    correct,
    expected: correct.then(|| problem.correct_answer()),
    error_type,
    feedback,
    wrong_attempts,
    solution_available: !correct && wrong_attempts >= state.config.policy.solution_after_wrong,
    next_difficulty,
    new_badges,
  })
}

#[instrument(level = "info", skip(state), fields(%problem_id))]
pub async fn reveal_solution(state: &AppState, problem_id: &str) -> Result<SolutionOut> {
  let issued = state
    .retire_problem(problem_id)
    .await
    .ok_or_else(|| TutorError::UnknownProblem(problem_id.to_string()))?;
  info!(target: "practice", %problem_id, wrong_attempts = issued.wrong_attempts, "Solution revealed");
  Ok(SolutionOut {
    problem_id: problem_id.to_string(),
    correct_answer: issued.problem.correct_answer(),
    solution: issued.problem.solution_line(),
  })
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn session_stats(state: &AppState, session_id: &str) -> Result<StatsOut> {
  let records = state.exercises.for_session(session_id).await?;
  let total = records.len();
  let correct = records.iter().filter(|r| r.is_correct).count();
  let topic_stats = topic_stats(&records);
  let now = Utc::now();
  let days_practiced_this_week = days_practiced_this_week(&records, now);
  let current_streak = current_streak(&records, now.date_naive());
  let mut recent_activity = records;
  recent_activity.reverse();
  recent_activity.truncate(state.config.stats.recent_limit);

  Ok(StatsOut {
    session_id: session_id.to_string(),
    total_exercises: total,
    correct_exercises: correct,
    overall_accuracy: percentage(correct, total),
    days_practiced_this_week,
    current_streak,
    topic_stats,
    recent_activity,
  })
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn list_exercises(
  state: &AppState,
  session_id: &str,
  limit: Option<usize>,
  offset: Option<usize>,
) -> Result<Vec<ExerciseRecord>> {
  state.exercises.recent(session_id, offset.unwrap_or(0), limit.unwrap_or(50)).await
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn session_badges(state: &AppState, session_id: &str) -> Result<Vec<Badge>> {
  Ok(state.badges_of(session_id).await)
}

/// Per-topic aggregates, in `Topic::ALL` order, topics without attempts omitted.
pub fn topic_stats(records: &[ExerciseRecord]) -> Vec<TopicStats> {
  Topic::ALL
    .into_iter()
    .filter_map(|topic| {
      let of_topic: Vec<&ExerciseRecord> = records.iter().filter(|r| r.topic == topic).collect();
      if of_topic.is_empty() {
        return None;
      }
      let correct_count = of_topic.iter().filter(|r| r.is_correct).count();
      Some(TopicStats {
        topic,
        total_attempts: of_topic.len(),
        correct_count,
        accuracy_percentage: percentage(correct_count, of_topic.len()),
        common_errors: common_errors(&of_topic),
      })
    })
    .collect()
}

/// Most frequent error labels first; ties keep a stable label order.
fn common_errors(records: &[&ExerciseRecord]) -> Vec<ErrorType> {
  let mut counts: HashMap<ErrorType, usize> = HashMap::new();
  for e in records.iter().filter_map(|r| r.error_type) {
    *counts.entry(e).or_default() += 1;
  }
  let mut ranked: Vec<(ErrorType, usize)> = counts.into_iter().collect();
  ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
  ranked.into_iter().take(COMMON_ERRORS).map(|(e, _)| e).collect()
}

fn percentage(part: usize, whole: usize) -> f64 {
  if whole == 0 {
    return 0.0;
  }
  let pct = part as f64 * 100.0 / whole as f64;
  (pct * 10.0).round() / 10.0
}
