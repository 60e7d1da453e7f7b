//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, ErrorType, ExerciseRecord, GeneratedProblem, Notation, Operator, Topic, TopicStats};
use crate::progress::{Badge, BadgeType};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewProblem {
        topic: String,
        #[serde(default)]
        difficulty: Option<i64>,
    },
    SubmitAnswer {
        #[serde(rename = "problemId")]
        problem_id: String,
        answer: String,
    },
    ShowSolution {
        #[serde(rename = "problemId")]
        problem_id: String,
    },
    Stats,
    Badges,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Problem {
        problem: ProblemOut,
    },
    AnswerResult {
        result: AnswerOut,
    },
    Solution {
        solution: SolutionOut,
    },
    Stats {
        stats: StatsOut,
    },
    Badges {
        badges: Vec<Badge>,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for problem delivery. Never carries the answer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOut {
    pub problem_id: String,
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub operand1: u64,
    pub operand2: u64,
    pub operator: Operator,
    pub notation: Notation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding_target: Option<u64>,
}

/// Convert an issued problem to the public DTO.
pub fn to_out(problem_id: &str, difficulty: Difficulty, p: &GeneratedProblem) -> ProblemOut {
    ProblemOut {
        problem_id: problem_id.to_string(),
        topic: p.topic(),
        difficulty,
        operand1: p.operand1(),
        operand2: p.operand2(),
        operator: p.operator(),
        notation: p.notation(),
        rounding_target: p.rounding_target(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemQuery {
    pub topic: String,
    pub difficulty: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub problem_id: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub correct: bool,
    /// Only revealed once solved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    pub feedback: String,
    pub wrong_attempts: u32,
    pub solution_available: bool,
    pub next_difficulty: Difficulty,
    /// Badges this answer unlocked.
    #[serde(default)]
    pub new_badges: Vec<BadgeType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionIn {
    pub problem_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionOut {
    pub problem_id: String,
    pub correct_answer: u64,
    pub solution: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOut {
    pub session_id: String,
    pub total_exercises: usize,
    pub correct_exercises: usize,
    pub overall_accuracy: f64,
    pub days_practiced_this_week: usize,
    pub current_streak: usize,
    pub topic_stats: Vec<TopicStats>,
    pub recent_activity: Vec<ExerciseRecord>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
