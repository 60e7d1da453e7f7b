//! Decimal digit helpers shared by the generator and the classifier.
//!
//! Digit vectors are most-significant first, so index 0 is the leading digit
//! and the last index is the units column.

use std::ops::RangeInclusive;

/// Decimal digits of `n`, most-significant first. `0` yields `[0]`.
pub fn digits_of(mut n: u64) -> Vec<u8> {
  let mut out = Vec::new();
  loop {
    out.push((n % 10) as u8);
    n /= 10;
    if n == 0 { break; }
  }
  out.reverse();
  out
}

/// Inverse of `digits_of`. Callers keep the vector short enough to fit.
pub fn from_digits(ds: &[u8]) -> u64 {
  ds.iter().fold(0, |acc, &d| acc * 10 + u64::from(d))
}

/// All numbers with exactly `count` decimal digits (`count >= 1`).
pub fn range_for_digits(count: u32) -> RangeInclusive<u64> {
  let min = if count <= 1 { 0 } else { 10u64.pow(count - 1) };
  min..=10u64.pow(count) - 1
}

/// Left-pad both digit vectors with zeros to a common length.
pub fn aligned(a: u64, b: u64) -> (Vec<u8>, Vec<u8>) {
  let (mut da, mut db) = (digits_of(a), digits_of(b));
  let width = da.len().max(db.len());
  pad_left(&mut da, width);
  pad_left(&mut db, width);
  (da, db)
}

fn pad_left(ds: &mut Vec<u8>, width: usize) {
  if ds.len() < width {
    let mut padded = vec![0; width - ds.len()];
    padded.append(ds);
    *ds = padded;
  }
}

/// True when any column of `a + b` overflows past 9.
pub fn needs_carry(a: u64, b: u64) -> bool {
  let (da, db) = aligned(a, b);
  da.iter().zip(&db).any(|(x, y)| x + y >= 10)
}

/// True when any column of `a - b` has a smaller minuend digit.
pub fn needs_borrow(a: u64, b: u64) -> bool {
  let (da, db) = aligned(a, b);
  da.iter().zip(&db).any(|(x, y)| x < y)
}

/// Round to the nearest multiple of `unit`, ties upward. `None` on zero unit or overflow.
pub fn round_half_up(n: u64, unit: u64) -> Option<u64> {
  if unit == 0 { return None; }
  let half = unit / 2;
  n.checked_add(half).map(|v| v / unit).and_then(|q| q.checked_mul(unit))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digits_roundtrip_examples() {
    assert_eq!(digits_of(0), vec![0]);
    assert_eq!(digits_of(4071), vec![4, 0, 7, 1]);
    assert_eq!(from_digits(&[0, 3, 5]), 35);
  }

  #[test]
  fn ranges_cover_exact_digit_counts() {
    assert_eq!(range_for_digits(2), 10..=99);
    assert_eq!(range_for_digits(4), 1000..=9999);
  }

  #[test]
  fn alignment_pads_the_shorter_number() {
    assert_eq!(aligned(52, 7), (vec![5, 2], vec![0, 7]));
  }

  #[test]
  fn carry_and_borrow_detection() {
    assert!(!needs_carry(41, 38));
    assert!(needs_carry(247, 168));
    assert!(!needs_borrow(58, 27));
    assert!(needs_borrow(52, 27));
  }

  #[test]
  fn rounding_half_up() {
    assert_eq!(round_half_up(847, 10), Some(850));
    assert_eq!(round_half_up(845, 10), Some(850));
    assert_eq!(round_half_up(844, 10), Some(840));
    assert_eq!(round_half_up(99_500, 1000), Some(100_000));
    assert_eq!(round_half_up(5, 0), None);
  }
}
