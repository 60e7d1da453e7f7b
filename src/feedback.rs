//! Read-only feedback texts shown to the child (Czech UI).
//!
//! Plain lookup tables; nothing here holds state.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::ErrorType;

/// Praise for a correct answer, one picked at random.
pub const PRAISE: &[&str] = &[
  "Výborně!",
  "Správně!",
  "Skvělé!",
  "Tak držet!",
  "Paráda!",
  "Super!",
];

/// Shown on a wrong answer when no finer diagnosis applies.
pub const TRY_AGAIN: &str = "Zkus to znovu";

pub fn praise<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
  PRAISE.choose(rng).copied().unwrap_or("Správně!")
}

/// Targeted hint for a diagnosed mistake.
pub fn error_hint(error: ErrorType) -> &'static str {
  match error {
    ErrorType::CarryError => "Zkontroluj si přenos - nezapomněl/a jsi přičíst jedničku?",
    ErrorType::BorrowError => "Zkontroluj si půjčování - nezapomněl/a jsi odečíst jedničku?",
    ErrorType::PlaceValueError => "Zkontroluj si jednotlivé sloupce - pozice číslic jsou důležité!",
    ErrorType::CalculationError => "Zkus si výpočet projít znovu krok po kroku.",
    ErrorType::RoundingDirectionError => "Pamatuj: 0-4 dolů, 5-9 nahoru!",
  }
}

/// Full message for a wrong answer.
pub fn wrong_answer_message(error: Option<ErrorType>) -> String {
  match error {
    Some(e) => format!("{}. {}", TRY_AGAIN, error_hint(e)),
    None => TRY_AGAIN.to_string(),
  }
}
