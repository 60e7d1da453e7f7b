//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to the practice flow. We reply with a single JSON message per request.
//! Every connection is its own practice session.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};
use uuid::Uuid;

use crate::error::TutorError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "pocitadlo_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session_id = Uuid::new_v4().to_string();
  info!(target: "pocitadlo_backend", %session_id, "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "pocitadlo_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &session_id).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "pocitadlo_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  let released = state.end_session(&session_id).await;
  info!(target: "pocitadlo_backend", %session_id, problems = released.problems, "WebSocket disconnected");
}

fn error_reply(e: TutorError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
pub(crate) async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session_id: &str) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewProblem { topic, difficulty } => {
      match new_problem(state, session_id, &topic, difficulty).await {
        Ok(problem) => {
          info!(target: "practice", id = %problem.problem_id, %topic, "WS new_problem served");
          ServerWsMessage::Problem { problem }
        }
        Err(e) => error_reply(e),
      }
    }

    ClientWsMessage::SubmitAnswer { problem_id, answer } => {
      match submit_answer(state, &problem_id, &answer).await {
        Ok(result) => {
          info!(target: "practice", id = %problem_id, correct = result.correct, "WS submit_answer evaluated");
          ServerWsMessage::AnswerResult { result }
        }
        Err(e) => error_reply(e),
      }
    }

    ClientWsMessage::ShowSolution { problem_id } => match reveal_solution(state, &problem_id).await {
      Ok(solution) => ServerWsMessage::Solution { solution },
      Err(e) => error_reply(e),
    },

    ClientWsMessage::Stats => match session_stats(state, session_id).await {
      Ok(stats) => ServerWsMessage::Stats { stats },
      Err(e) => error_reply(e),
    },

    ClientWsMessage::Badges => match session_badges(state, session_id).await {
      Ok(badges) => ServerWsMessage::Badges { badges },
      Err(e) => error_reply(e),
    },
  }
}
