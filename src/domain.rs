//! Domain models used by the backend: topics, difficulty, generated problems,
//! diagnostic error labels and persisted exercise records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digits::round_half_up;
use crate::error::{Result, TutorError};

/// Which arithmetic skill is being practised?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
  Addition,
  Subtraction,
  Multiplication,
  Division,
  Rounding,
}

impl Topic {
  pub const ALL: [Topic; 5] = [
    Topic::Addition,
    Topic::Subtraction,
    Topic::Multiplication,
    Topic::Division,
    Topic::Rounding,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Topic::Addition => "addition",
      Topic::Subtraction => "subtraction",
      Topic::Multiplication => "multiplication",
      Topic::Division => "division",
      Topic::Rounding => "rounding",
    }
  }
}

impl fmt::Display for Topic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Topic {
  type Err = TutorError;

  fn from_str(s: &str) -> Result<Self> {
    let wanted = s.trim().to_ascii_lowercase();
    Topic::ALL
      .into_iter()
      .find(|t| t.as_str() == wanted)
      .ok_or_else(|| TutorError::UnknownTopic(s.to_string()))
  }
}

/// Difficulty level 1..=3. Not part of a problem; the caller picks it per request.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
  pub const MIN: Difficulty = Difficulty(1);
  pub const MAX: Difficulty = Difficulty(3);

  pub fn get(self) -> u8 { self.0 }

  /// One level up, saturating at `MAX`.
  pub fn raised(self) -> Difficulty {
    Difficulty((self.0 + 1).min(Self::MAX.0))
  }

  /// One level down, saturating at `MIN`.
  pub fn lowered(self) -> Difficulty {
    Difficulty((self.0 - 1).max(Self::MIN.0))
  }
}

impl Default for Difficulty {
  fn default() -> Self { Difficulty::MIN }
}

impl TryFrom<i64> for Difficulty {
  type Error = TutorError;

  fn try_from(value: i64) -> Result<Self> {
    match value {
      1..=3 => Ok(Difficulty(value as u8)),
      other => Err(TutorError::InvalidDifficulty(other)),
    }
  }
}

impl From<Difficulty> for u8 {
  fn from(d: Difficulty) -> u8 { d.0 }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Symbolic operator shown to the child. Serialized as the symbol itself.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operator {
  #[serde(rename = "+")]
  Plus,
  #[serde(rename = "-")]
  Minus,
  #[serde(rename = "×")]
  Times,
  #[serde(rename = ":")]
  Divide,
  #[serde(rename = "≈")]
  Approx,
}

impl Operator {
  pub fn symbol(self) -> &'static str {
    match self {
      Operator::Plus => "+",
      Operator::Minus => "-",
      Operator::Times => "×",
      Operator::Divide => ":",
      Operator::Approx => "≈",
    }
  }

  pub fn topic(self) -> Topic {
    match self {
      Operator::Plus => Topic::Addition,
      Operator::Minus => Topic::Subtraction,
      Operator::Times => Topic::Multiplication,
      Operator::Divide => Topic::Division,
      Operator::Approx => Topic::Rounding,
    }
  }
}

/// Presentation hint only: horizontal equation vs stacked columns.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
  Inline,
  Column,
}

/// Diagnostic label attached to a wrong answer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
  CarryError,
  BorrowError,
  PlaceValueError,
  CalculationError,
  RoundingDirectionError,
}

impl ErrorType {
  pub fn as_str(self) -> &'static str {
    match self {
      ErrorType::CarryError => "carry_error",
      ErrorType::BorrowError => "borrow_error",
      ErrorType::PlaceValueError => "place_value_error",
      ErrorType::CalculationError => "calculation_error",
      ErrorType::RoundingDirectionError => "rounding_direction_error",
    }
  }
}

impl fmt::Display for ErrorType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Wire/persisted shape of a problem. Carries no answer: the answer is
/// always recomputed when this is turned back into a `GeneratedProblem`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemData {
  pub operand1: u64,
  pub operand2: u64,
  pub operator: Operator,
  pub notation: Notation,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rounding_target: Option<u64>,
}

/// Immutable problem produced by the generator for one practice turn.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "ProblemData")]
pub struct GeneratedProblem {
  operand1: u64,
  operand2: u64,
  operator: Operator,
  correct_answer: u64,
  notation: Notation,
  #[serde(skip_serializing_if = "Option::is_none")]
  rounding_target: Option<u64>,
}

/// Units a rounding problem may target.
pub const ROUNDING_TARGETS: [u64; 3] = [10, 100, 1000];

impl GeneratedProblem {
  /// Build a problem from its operands, computing the answer. Rejects
  /// anything that is not a structurally valid exercise.
  pub fn new(operand1: u64, operand2: u64, operator: Operator, notation: Notation) -> Result<Self> {
    if notation == Notation::Column && matches!(operator, Operator::Divide | Operator::Approx) {
      return Err(TutorError::InvalidProblem(format!(
        "{} problems are always inline",
        operator.topic()
      )));
    }
    let correct_answer = Self::canonical_answer(operand1, operand2, operator)?;
    Ok(Self::assemble(operand1, operand2, operator, correct_answer, notation))
  }

  /// Used by the generator, which derives the answer while constructing operands.
  pub(crate) fn assemble(
    operand1: u64,
    operand2: u64,
    operator: Operator,
    correct_answer: u64,
    notation: Notation,
  ) -> Self {
    debug_assert_eq!(
      Self::canonical_answer(operand1, operand2, operator).ok(),
      Some(correct_answer),
      "generator disagrees with canonical arithmetic"
    );
    let rounding_target = (operator == Operator::Approx).then_some(operand2);
    Self { operand1, operand2, operator, correct_answer, notation, rounding_target }
  }

  /// The unique correct result for the operands and operator.
  pub fn canonical_answer(operand1: u64, operand2: u64, operator: Operator) -> Result<u64> {
    let overflow = || TutorError::InvalidProblem(format!("{operand1} {} {operand2} overflows", operator.symbol()));
    match operator {
      Operator::Plus => operand1.checked_add(operand2).ok_or_else(overflow),
      Operator::Minus => operand1.checked_sub(operand2).ok_or_else(|| {
        TutorError::InvalidProblem(format!("{operand1} - {operand2} would be negative"))
      }),
      Operator::Times => operand1.checked_mul(operand2).ok_or_else(overflow),
      Operator::Divide => {
        if operand2 == 0 {
          return Err(TutorError::InvalidProblem("division by zero".into()));
        }
        if operand1 % operand2 != 0 {
          return Err(TutorError::InvalidProblem(format!(
            "{operand1} : {operand2} leaves a remainder"
          )));
        }
        Ok(operand1 / operand2)
      }
      Operator::Approx => {
        if !ROUNDING_TARGETS.contains(&operand2) {
          return Err(TutorError::InvalidProblem(format!(
            "rounding target {operand2} is not one of 10, 100, 1000"
          )));
        }
        round_half_up(operand1, operand2).ok_or_else(overflow)
      }
    }
  }

  pub fn operand1(&self) -> u64 { self.operand1 }
  pub fn operand2(&self) -> u64 { self.operand2 }
  pub fn operator(&self) -> Operator { self.operator }
  pub fn correct_answer(&self) -> u64 { self.correct_answer }
  pub fn notation(&self) -> Notation { self.notation }
  pub fn rounding_target(&self) -> Option<u64> { self.rounding_target }

  pub fn topic(&self) -> Topic { self.operator.topic() }

  pub fn data(&self) -> ProblemData {
    ProblemData {
      operand1: self.operand1,
      operand2: self.operand2,
      operator: self.operator,
      notation: self.notation,
      rounding_target: self.rounding_target,
    }
  }

  /// "41 + 38 = 79" style line used when revealing the solution.
  pub fn solution_line(&self) -> String {
    match self.operator {
      Operator::Approx => format!("{} ≈ {}", self.operand1, self.correct_answer),
      _ => format!("{} = {}", self, self.correct_answer),
    }
  }
}

impl fmt::Display for GeneratedProblem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.operator {
      Operator::Approx => write!(f, "{} ≈ ? (to {})", self.operand1, self.operand2),
      op => write!(f, "{} {} {}", self.operand1, op.symbol(), self.operand2),
    }
  }
}

impl TryFrom<ProblemData> for GeneratedProblem {
  type Error = TutorError;

  fn try_from(data: ProblemData) -> Result<Self> {
    match (data.operator, data.rounding_target) {
      (Operator::Approx, Some(t)) if t != data.operand2 => {
        return Err(TutorError::InvalidProblem(format!(
          "roundingTarget {t} disagrees with operand2 {}",
          data.operand2
        )));
      }
      (op, Some(_)) if op != Operator::Approx => {
        return Err(TutorError::InvalidProblem("roundingTarget is only valid for rounding".into()));
      }
      _ => {}
    }
    GeneratedProblem::new(data.operand1, data.operand2, data.operator, data.notation)
  }
}

/// One graded submission, as handed to the exercise store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
  pub id: String,
  pub session_id: String,
  pub topic: Topic,
  pub difficulty: Difficulty,
  pub problem: ProblemData,
  /// Raw text as typed, kept verbatim.
  pub user_answer: String,
  pub correct_answer: u64,
  pub is_correct: bool,
  #[serde(default)]
  pub error_type: Option<ErrorType>,
  pub time_spent_seconds: u64,
  pub created_at: DateTime<Utc>,
}

/// Aggregate over one topic's records.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
  pub topic: Topic,
  pub total_attempts: usize,
  pub correct_count: usize,
  pub accuracy_percentage: f64,
  pub common_errors: Vec<ErrorType>,
}
