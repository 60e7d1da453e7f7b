//! Adaptive difficulty across practice turns.
//!
//! Runs on the caller side of the generator: it only decides which level to
//! ask for next. Up after a streak of correct answers, down after repeated
//! failures on the same problem.

use crate::config::DifficultyPolicy;
use crate::domain::Difficulty;

#[derive(Clone, Debug)]
pub struct DifficultyController {
    current: Difficulty,
    consecutive_correct: u32,
}

impl DifficultyController {
    pub fn new(start: Difficulty) -> Self {
        Self { current: start, consecutive_correct: 0 }
    }

    pub fn current(&self) -> Difficulty {
        self.current
    }

    pub fn streak(&self) -> u32 {
        self.consecutive_correct
    }

    /// Count a correct answer; returns the level for the next problem.
    pub fn record_correct(&mut self, policy: &DifficultyPolicy) -> Difficulty {
        self.consecutive_correct += 1;
        if self.consecutive_correct >= policy.promote_after && self.current < Difficulty::MAX {
            self.current = self.current.raised();
            self.consecutive_correct = 0;
        }
        self.current
    }

    /// Count a wrong answer. `wrong_attempts` is the running total on the
    /// current problem, this one included.
    pub fn record_wrong(&mut self, policy: &DifficultyPolicy, wrong_attempts: u32) -> Difficulty {
        self.consecutive_correct = 0;
        if wrong_attempts >= policy.demote_after_wrong && self.current > Difficulty::MIN {
            self.current = self.current.lowered();
        }
        self.current
    }
}
