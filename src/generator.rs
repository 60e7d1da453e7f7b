//! Arithmetic problem synthesis.
//!
//! Each topic has its own construction. Addition and subtraction build both
//! operands digit by digit under a per-column constraint, so "no carry",
//! "forced carry", "no borrow" and "forced borrow" hold by construction
//! instead of by patching a random pair afterwards.
//!
//! Randomness is injected: pass `thread_rng()` in the server and a seeded
//! `StdRng` in tests.

use rand::Rng;

use crate::digits::{from_digits, needs_borrow, needs_carry, range_for_digits};
use crate::domain::{Difficulty, GeneratedProblem, Notation, Operator, Topic};

/// Generate one problem for `topic` at `difficulty`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, topic: Topic, difficulty: Difficulty) -> GeneratedProblem {
  match topic {
    Topic::Addition => addition(rng, difficulty),
    Topic::Subtraction => subtraction(rng, difficulty),
    Topic::Multiplication => multiplication(rng, difficulty),
    Topic::Division => division(rng, difficulty),
    Topic::Rounding => rounding(rng, difficulty),
  }
}

/// Operand width for the column topics: 2, 3 or 4 digits.
fn operand_digits(difficulty: Difficulty) -> usize {
  usize::from(difficulty.get()) + 1
}

fn column_notation(difficulty: Difficulty) -> Notation {
  if difficulty.get() >= 2 { Notation::Column } else { Notation::Inline }
}

fn addition<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> GeneratedProblem {
  let width = operand_digits(difficulty);
  let (a, b) = if difficulty == Difficulty::MIN {
    addends_without_carry(rng, width)
  } else {
    addends_with_carry(rng, width)
  };
  debug_assert_eq!(needs_carry(a, b), difficulty != Difficulty::MIN, "{a} + {b}");
  GeneratedProblem::assemble(a, b, Operator::Plus, a + b, column_notation(difficulty))
}

/// Every column sums to at most 9. Both operands keep a non-zero leading digit.
fn addends_without_carry<R: Rng + ?Sized>(rng: &mut R, width: usize) -> (u64, u64) {
  let mut da = Vec::with_capacity(width);
  let mut db = Vec::with_capacity(width);
  for i in 0..width {
    let low = if i == 0 { 1 } else { 0 };
    let x = rng.gen_range(low..=4u8);
    let y = rng.gen_range(low..=9 - x);
    da.push(x);
    db.push(y);
  }
  (from_digits(&da), from_digits(&db))
}

/// Random `width`-digit operands whose units column is forced to carry.
fn addends_with_carry<R: Rng + ?Sized>(rng: &mut R, width: usize) -> (u64, u64) {
  let mut da = random_digits(rng, width);
  let mut db = random_digits(rng, width);
  let units = width - 1;
  if da[units] + db[units] < 10 {
    // A zero units digit can never carry; lift it first.
    if da[units] == 0 {
      da[units] = rng.gen_range(1..=9);
    }
    db[units] = rng.gen_range(10 - da[units]..=9);
  }
  (from_digits(&da), from_digits(&db))
}

fn subtraction<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> GeneratedProblem {
  let width = operand_digits(difficulty);
  let (a, b) = if difficulty == Difficulty::MIN {
    pair_without_borrow(rng, width)
  } else {
    pair_with_borrow(rng, width)
  };
  debug_assert_eq!(needs_borrow(a, b), difficulty != Difficulty::MIN, "{a} - {b}");
  GeneratedProblem::assemble(a, b, Operator::Minus, a - b, column_notation(difficulty))
}

/// Subtrahend digit never exceeds the minuend digit; the units column is
/// strictly smaller so the difference is never zero.
fn pair_without_borrow<R: Rng + ?Sized>(rng: &mut R, width: usize) -> (u64, u64) {
  debug_assert!(width >= 2);
  let units = width - 1;
  let mut da = Vec::with_capacity(width);
  let mut db = Vec::with_capacity(width);
  for i in 0..width {
    let (x, y) = if i == 0 {
      let x = rng.gen_range(1..=9u8);
      (x, rng.gen_range(1..=x))
    } else if i == units {
      let x = rng.gen_range(1..=9u8);
      (x, rng.gen_range(0..x))
    } else {
      let x = rng.gen_range(0..=9u8);
      (x, rng.gen_range(0..=x))
    };
    da.push(x);
    db.push(y);
  }
  (from_digits(&da), from_digits(&db))
}

/// Minuend leads from the upper part of the range and strictly above the
/// subtrahend's leading digit; the units column always borrows.
fn pair_with_borrow<R: Rng + ?Sized>(rng: &mut R, width: usize) -> (u64, u64) {
  debug_assert!(width >= 2);
  let units = width - 1;
  let mut da = random_digits(rng, width);
  let mut db = random_digits(rng, width);
  da[0] = rng.gen_range(2..=9);
  db[0] = rng.gen_range(1..da[0]);
  if da[units] >= db[units] {
    da[units] = rng.gen_range(0..=8);
    db[units] = rng.gen_range(da[units] + 1..=9);
  }
  (from_digits(&da), from_digits(&db))
}

fn multiplication<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> GeneratedProblem {
  let multiplicand = rng.gen_range(range_for_digits(operand_digits(difficulty) as u32));
  let multiplier = rng.gen_range(2..=9u64);
  GeneratedProblem::assemble(
    multiplicand,
    multiplier,
    Operator::Times,
    multiplicand * multiplier,
    column_notation(difficulty),
  )
}

/// Built backwards from divisor and quotient, so it always divides exactly.
fn division<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> GeneratedProblem {
  let divisor = rng.gen_range(2..=9u64);
  let quotient = match difficulty.get() {
    1 => rng.gen_range(10..=99u64),
    2 => rng.gen_range(100..=999u64),
    _ => rng.gen_range(100..=1500u64),
  };
  GeneratedProblem::assemble(quotient * divisor, divisor, Operator::Divide, quotient, Notation::Inline)
}

fn rounding<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> GeneratedProblem {
  let (number, target) = match difficulty.get() {
    1 => (rng.gen_range(100..=999u64), 10),
    2 => (rng.gen_range(1000..=9999u64), 100),
    _ => (rng.gen_range(1000..=99_999u64), 1000),
  };
  let answer = (number + target / 2) / target * target;
  GeneratedProblem::assemble(number, target, Operator::Approx, answer, Notation::Inline)
}

/// `width` random digits with a non-zero leading digit.
fn random_digits<R: Rng + ?Sized>(rng: &mut R, width: usize) -> Vec<u8> {
  (0..width)
    .map(|i| if i == 0 { rng.gen_range(1..=9) } else { rng.gen_range(0..=9) })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::digits::digits_of;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  const SAMPLES: usize = 500;

  fn each_problem(topic: Topic, level: i64, mut check: impl FnMut(&GeneratedProblem)) {
    let difficulty = Difficulty::try_from(level).unwrap();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE + level as u64);
    for _ in 0..SAMPLES {
      check(&generate(&mut rng, topic, difficulty));
    }
  }

  fn width(n: u64) -> usize { digits_of(n).len() }

  #[test]
  fn answers_match_canonical_arithmetic() {
    for topic in Topic::ALL {
      for level in 1..=3 {
        each_problem(topic, level, |p| {
          let expected = GeneratedProblem::canonical_answer(p.operand1(), p.operand2(), p.operator()).unwrap();
          assert_eq!(p.correct_answer(), expected, "{p}");
          assert_eq!(p.topic(), topic);
        });
      }
    }
  }

  #[test]
  fn same_seed_same_problem() {
    let d = Difficulty::try_from(2).unwrap();
    let a = generate(&mut StdRng::seed_from_u64(7), Topic::Subtraction, d);
    let b = generate(&mut StdRng::seed_from_u64(7), Topic::Subtraction, d);
    assert_eq!(a, b);
  }

  #[test]
  fn easy_addition_never_carries() {
    each_problem(Topic::Addition, 1, |p| {
      assert!(!needs_carry(p.operand1(), p.operand2()), "{p}");
      assert_eq!(width(p.operand1()), 2);
      assert_eq!(width(p.operand2()), 2);
      assert_eq!(p.notation(), Notation::Inline);
    });
  }

  #[test]
  fn harder_addition_always_carries() {
    for (level, digits) in [(2, 3), (3, 4)] {
      each_problem(Topic::Addition, level, |p| {
        assert!(needs_carry(p.operand1(), p.operand2()), "{p}");
        assert_eq!(width(p.operand1()), digits);
        assert_eq!(width(p.operand2()), digits);
        assert_eq!(p.notation(), Notation::Column);
      });
    }
  }

  #[test]
  fn easy_subtraction_never_borrows_and_stays_positive() {
    each_problem(Topic::Subtraction, 1, |p| {
      assert!(!needs_borrow(p.operand1(), p.operand2()), "{p}");
      assert!(p.correct_answer() > 0, "{p}");
      assert_eq!(width(p.operand1()), 2);
      assert_eq!(p.notation(), Notation::Inline);
    });
  }

  #[test]
  fn harder_subtraction_always_borrows() {
    for (level, digits) in [(2, 3), (3, 4)] {
      each_problem(Topic::Subtraction, level, |p| {
        assert!(needs_borrow(p.operand1(), p.operand2()), "{p}");
        assert!(p.operand1() > p.operand2(), "{p}");
        assert_eq!(width(p.operand1()), digits);
        assert_eq!(p.notation(), Notation::Column);
      });
    }
  }

  #[test]
  fn multiplication_uses_single_digit_multiplier() {
    for (level, digits) in [(1, 2), (2, 3), (3, 4)] {
      each_problem(Topic::Multiplication, level, |p| {
        assert!((2..=9).contains(&p.operand2()), "{p}");
        assert_eq!(width(p.operand1()), digits);
      });
    }
  }

  #[test]
  fn division_is_always_exact() {
    for (level, quotients) in [(1, 10..=99), (2, 100..=999), (3, 100..=1500)] {
      each_problem(Topic::Division, level, |p| {
        assert_eq!(p.operand1(), p.correct_answer() * p.operand2(), "{p}");
        assert!((2..=9).contains(&p.operand2()));
        assert!(quotients.contains(&p.correct_answer()));
        assert_eq!(p.notation(), Notation::Inline);
      });
    }
  }

  #[test]
  fn rounding_lands_on_a_nearby_multiple() {
    for (level, target) in [(1, 10), (2, 100), (3, 1000)] {
      each_problem(Topic::Rounding, level, |p| {
        assert_eq!(p.rounding_target(), Some(target));
        assert_eq!(p.operand2(), target);
        assert_eq!(p.correct_answer() % target, 0, "{p}");
        assert!(p.operand1().abs_diff(p.correct_answer()) <= target / 2, "{p}");
        assert_eq!(p.notation(), Notation::Inline);
      });
    }
  }

  #[test]
  fn rounding_widths_follow_difficulty() {
    each_problem(Topic::Rounding, 1, |p| assert_eq!(width(p.operand1()), 3));
    each_problem(Topic::Rounding, 2, |p| assert_eq!(width(p.operand1()), 4));
    each_problem(Topic::Rounding, 3, |p| assert!((4..=5).contains(&width(p.operand1()))));
  }
}
