//! Best-effort diagnosis of a wrong numeric answer.
//!
//! Each operator owns an ordered table of rules; the first rule whose
//! predicate matches labels the answer, and anything that matches nothing is
//! a plain `calculation_error`. New heuristics are appended to a table
//! without touching the dispatch.
//!
//! The classifier never fails: any `i64` answer gets a label, or `None` when
//! it is correct.

use crate::digits::aligned;
use crate::domain::{ErrorType, GeneratedProblem, Operator};

/// A single `(predicate -> label)` heuristic.
pub struct Rule {
  pub name: &'static str,
  pub label: ErrorType,
  matches: fn(&Attempt<'_>) -> bool,
}

/// Outcome of classification, naming the rule that fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diagnosis {
  pub label: ErrorType,
  pub rule: &'static str,
}

/// Rule name reported when no table entry matched.
pub const FALLBACK_RULE: &str = "fallback";

/// A wrong answer together with the problem it answers.
pub struct Attempt<'a> {
  problem: &'a GeneratedProblem,
  answer: i64,
  /// `|answer - correct|`, never zero once past the equality check.
  diff: u128,
}

impl<'a> Attempt<'a> {
  fn new(problem: &'a GeneratedProblem, answer: i64) -> Self {
    let diff = (i128::from(answer) - i128::from(problem.correct_answer())).unsigned_abs();
    Self { problem, answer, diff }
  }

  fn answer_is(&self, value: u64) -> bool {
    i128::from(self.answer) == i128::from(value)
  }
}

const ADDITION_RULES: &[Rule] = &[
  Rule { name: "off_by_power_of_ten", label: ErrorType::CarryError, matches: off_by_power_of_ten },
  Rule { name: "single_digit_slip", label: ErrorType::CalculationError, matches: single_digit_slip },
  Rule { name: "transposed_digits", label: ErrorType::PlaceValueError, matches: transposed_digits },
];

const SUBTRACTION_RULES: &[Rule] = &[
  Rule { name: "off_by_power_of_ten", label: ErrorType::BorrowError, matches: off_by_power_of_ten },
  Rule { name: "column_magnitude_difference", label: ErrorType::BorrowError, matches: column_magnitude_difference },
];

const MULTIPLICATION_RULES: &[Rule] = &[
  Rule { name: "dropped_carry_in_product", label: ErrorType::CarryError, matches: dropped_carry_in_product },
];

const DIVISION_RULES: &[Rule] = &[];

const ROUNDING_RULES: &[Rule] = &[
  Rule { name: "opposite_direction", label: ErrorType::RoundingDirectionError, matches: opposite_rounding_direction },
];

/// Ordered rule table for an operator.
pub fn rules_for(operator: Operator) -> &'static [Rule] {
  match operator {
    Operator::Plus => ADDITION_RULES,
    Operator::Minus => SUBTRACTION_RULES,
    Operator::Times => MULTIPLICATION_RULES,
    Operator::Divide => DIVISION_RULES,
    Operator::Approx => ROUNDING_RULES,
  }
}

/// Label for `answer`, or `None` when it is correct.
pub fn classify(problem: &GeneratedProblem, answer: i64) -> Option<ErrorType> {
  diagnose(problem, answer).map(|d| d.label)
}

/// Like `classify`, but also reports which rule decided.
pub fn diagnose(problem: &GeneratedProblem, answer: i64) -> Option<Diagnosis> {
  let attempt = Attempt::new(problem, answer);
  if attempt.diff == 0 {
    return None;
  }
  let diagnosis = rules_for(problem.operator())
    .iter()
    .find(|rule| (rule.matches)(&attempt))
    .map(|rule| Diagnosis { label: rule.label, rule: rule.name })
    .unwrap_or(Diagnosis { label: ErrorType::CalculationError, rule: FALLBACK_RULE });
  Some(diagnosis)
}

// -------- Predicates --------

/// Off by exactly one unit in a single higher column.
fn off_by_power_of_ten(a: &Attempt<'_>) -> bool {
  matches!(a.diff, 10 | 100 | 1000 | 10_000)
}

fn same_length_mismatches(a: &Attempt<'_>) -> Option<usize> {
  let given = a.answer.to_string();
  let correct = a.problem.correct_answer().to_string();
  (given.len() == correct.len())
    .then(|| given.bytes().zip(correct.bytes()).filter(|(x, y)| x != y).count())
}

fn single_digit_slip(a: &Attempt<'_>) -> bool {
  same_length_mismatches(a) == Some(1)
}

/// Two positions differ and the digits are an anagram of the correct ones.
fn transposed_digits(a: &Attempt<'_>) -> bool {
  if same_length_mismatches(a) != Some(2) {
    return false;
  }
  let mut given: Vec<u8> = a.answer.to_string().into_bytes();
  let mut correct: Vec<u8> = a.problem.correct_answer().to_string().into_bytes();
  given.sort_unstable();
  correct.sort_unstable();
  given == correct
}

/// The answer a child gets by subtracting digit magnitudes column by column
/// without borrowing (52 - 27 -> |5-2|,|2-7| -> 35).
fn column_magnitude_difference(a: &Attempt<'_>) -> bool {
  let (top, bottom) = aligned(a.problem.operand1(), a.problem.operand2());
  let naive = top
    .iter()
    .zip(&bottom)
    .fold(0u128, |acc, (x, y)| acc.saturating_mul(10).saturating_add(u128::from(x.abs_diff(*y))));
  a.answer >= 0 && u128::from(a.answer.unsigned_abs()) == naive
}

/// Off by a whole ten no larger than ten times the multiplier.
fn dropped_carry_in_product(a: &Attempt<'_>) -> bool {
  a.diff % 10 == 0 && a.diff <= u128::from(a.problem.operand2()) * 10
}

/// The child rounded the other way.
fn opposite_rounding_direction(a: &Attempt<'_>) -> bool {
  let target = a.problem.rounding_target().unwrap_or(a.problem.operand2());
  if target == 0 {
    return false;
  }
  let n = a.problem.operand1();
  let down = n / target * target;
  let Some(up) = n.div_ceil(target).checked_mul(target) else {
    return false;
  };
  let correct = a.problem.correct_answer();
  (a.answer_is(down) && correct == up) || (a.answer_is(up) && correct == down)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Notation, Topic};
  use crate::generator::generate;
  use rand::rngs::StdRng;
  use rand::{Rng, SeedableRng};

  fn problem(a: u64, b: u64, op: Operator) -> GeneratedProblem {
    GeneratedProblem::new(a, b, op, Notation::Inline).unwrap()
  }

  #[test]
  fn correct_answer_has_no_label() {
    let p = problem(247, 168, Operator::Plus);
    assert_eq!(classify(&p, 415), None);
  }

  #[test]
  fn addition_off_by_ten_is_a_carry_error() {
    let p = problem(247, 168, Operator::Plus);
    assert_eq!(classify(&p, 405), Some(ErrorType::CarryError));
    assert_eq!(classify(&p, 515), Some(ErrorType::CarryError));
  }

  #[test]
  fn addition_single_digit_slip_is_calculation() {
    let p = problem(247, 168, Operator::Plus);
    let d = diagnose(&p, 416).unwrap();
    assert_eq!(d, Diagnosis { label: ErrorType::CalculationError, rule: "single_digit_slip" });
  }

  #[test]
  fn addition_transposed_digits_is_place_value() {
    let p = problem(247, 168, Operator::Plus);
    assert_eq!(classify(&p, 451), Some(ErrorType::PlaceValueError));
    assert_eq!(classify(&p, 145), Some(ErrorType::PlaceValueError));
  }

  #[test]
  fn first_matching_rule_wins() {
    // 415 vs 405: one digit differs too, but the power-of-ten rule is first.
    let p = problem(247, 168, Operator::Plus);
    assert_eq!(diagnose(&p, 405).unwrap().rule, "off_by_power_of_ten");
  }

  #[test]
  fn addition_other_answers_fall_back() {
    let p = problem(247, 168, Operator::Plus);
    assert_eq!(diagnose(&p, 999).unwrap().rule, "fallback");
    assert_eq!(classify(&p, 7), Some(ErrorType::CalculationError));
  }

  #[test]
  fn subtraction_magnitude_difference_is_a_borrow_error() {
    let p = problem(52, 27, Operator::Minus);
    assert_eq!(p.correct_answer(), 25);
    let d = diagnose(&p, 35).unwrap();
    assert_eq!(d.label, ErrorType::BorrowError);
    assert_eq!(d.rule, "off_by_power_of_ten");

    let p = problem(403, 158, Operator::Minus);
    // |4-1| |0-5| |3-8| -> 355
    assert_eq!(diagnose(&p, 355).unwrap().rule, "column_magnitude_difference");
  }

  #[test]
  fn subtraction_off_by_hundred_is_a_borrow_error() {
    let p = problem(403, 158, Operator::Minus);
    assert_eq!(classify(&p, 345), Some(ErrorType::BorrowError));
    assert_eq!(classify(&p, 244), Some(ErrorType::CalculationError));
  }

  #[test]
  fn multiplication_small_tens_are_carry_errors() {
    let p = problem(47, 6, Operator::Times);
    assert_eq!(p.correct_answer(), 282);
    assert_eq!(classify(&p, 242), Some(ErrorType::CarryError));
    assert_eq!(classify(&p, 222), Some(ErrorType::CarryError));
    assert_eq!(classify(&p, 212), Some(ErrorType::CalculationError));
    assert_eq!(classify(&p, 283), Some(ErrorType::CalculationError));
  }

  #[test]
  fn division_is_always_calculation() {
    let p = problem(138, 6, Operator::Divide);
    assert_eq!(classify(&p, 33), Some(ErrorType::CalculationError));
    assert_eq!(classify(&p, 23), None);
  }

  #[test]
  fn rounding_the_wrong_way() {
    let p = problem(847, 10, Operator::Approx);
    assert_eq!(classify(&p, 840), Some(ErrorType::RoundingDirectionError));
    assert_eq!(classify(&p, 800), Some(ErrorType::CalculationError));

    let p = problem(1249, 100, Operator::Approx);
    assert_eq!(classify(&p, 1300), Some(ErrorType::RoundingDirectionError));
  }

  #[test]
  fn rounding_exact_multiple_has_no_opposite_direction() {
    let p = problem(850, 10, Operator::Approx);
    assert_eq!(classify(&p, 840), Some(ErrorType::CalculationError));
  }

  #[test]
  fn extreme_answers_never_panic() {
    let mut rng = StdRng::seed_from_u64(42);
    let extremes = [i64::MIN, i64::MIN + 1, -1, 0, 1, i64::MAX - 1, i64::MAX];
    for topic in Topic::ALL {
      for level in 1..=3 {
        let p = generate(&mut rng, topic, Difficulty::try_from(level).unwrap());
        for answer in extremes {
          let label = classify(&p, answer);
          assert_eq!(label.is_none(), i128::from(answer) == i128::from(p.correct_answer()));
        }
        for _ in 0..50 {
          let answer: i64 = rng.gen();
          let _ = classify(&p, answer);
        }
      }
    }
  }

  #[test]
  fn generated_problems_accept_their_own_answer() {
    let mut rng = StdRng::seed_from_u64(9);
    for topic in Topic::ALL {
      for level in 1..=3 {
        for _ in 0..100 {
          let p = generate(&mut rng, topic, Difficulty::try_from(level).unwrap());
          assert_eq!(classify(&p, p.correct_answer() as i64), None);
        }
      }
    }
  }
}
