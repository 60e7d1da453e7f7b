//! HTTP endpoint handlers. These are thin wrappers that forward to the practice flow.
//! Each handler is instrumented; failures become a status code plus `{ "error": ... }`.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::domain::ExerciseRecord;
use crate::progress::Badge;
use crate::error::Result;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(topic = %q.topic))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProblemQuery>,
) -> Result<Json<ProblemOut>> {
  let session_id = q.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
  let out = new_problem(&state, session_id, &q.topic, q.difficulty).await?;
  info!(target: "practice", id = %out.problem_id, topic = %out.topic, difficulty = %out.difficulty, "HTTP problem served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.problem_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>> {
  let out = submit_answer(&state, &body.problem_id, &body.answer).await?;
  info!(target: "practice", id = %body.problem_id, correct = out.correct, "HTTP submit_answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.problem_id))]
pub async fn http_post_solution(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SolutionIn>,
) -> Result<Json<SolutionOut>> {
  Ok(Json(reveal_solution(&state, &body.problem_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<Json<StatsOut>> {
  let session_id = q.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
  Ok(Json(session_stats(&state, session_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_exercises(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<Json<Vec<ExerciseRecord>>> {
  let session_id = q.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
  Ok(Json(list_exercises(&state, session_id, q.limit, q.offset).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_badges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<Json<Vec<Badge>>> {
  let session_id = q.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
  Ok(Json(session_badges(&state, session_id).await?))
}
