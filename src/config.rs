//! Loading tutor configuration (difficulty policy, stats window, retention) from TOML.
//!
//! See `TutorConfig` for the expected schema. Every section is optional.
//!
//! ```toml
//! [policy]
//! start_difficulty = 1
//! promote_after = 5
//! demote_after_wrong = 3
//! solution_after_wrong = 2
//!
//! [stats]
//! recent_limit = 10
//!
//! [retention]
//! problem_ttl_secs = 1800
//! session_idle_secs = 7200
//! sweep_interval_secs = 60
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Difficulty;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub policy: DifficultyPolicy,
  #[serde(default)]
  pub stats: StatsConfig,
  #[serde(default)]
  pub retention: RetentionConfig,
}

/// Caller-side difficulty adjustment across practice turns.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DifficultyPolicy {
  /// Level a fresh session starts at.
  pub start_difficulty: Difficulty,
  /// Consecutive correct answers needed to move up one level.
  pub promote_after: u32,
  /// Wrong attempts on one problem that move the child down one level.
  pub demote_after_wrong: u32,
  /// Wrong attempts after which the solution is offered.
  pub solution_after_wrong: u32,
}

impl Default for DifficultyPolicy {
  fn default() -> Self {
    Self {
      start_difficulty: Difficulty::MIN,
      promote_after: 5,
      demote_after_wrong: 3,
      solution_after_wrong: 2,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
  /// How many recent exercises the stats view returns.
  pub recent_limit: usize,
}

impl Default for StatsConfig {
  fn default() -> Self { Self { recent_limit: 10 } }
}

/// How long unanswered problems and idle sessions are kept in memory.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
  pub problem_ttl_secs: u64,
  pub session_idle_secs: u64,
  pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
  fn default() -> Self {
    Self {
      problem_ttl_secs: 30 * 60,
      session_idle_secs: 2 * 60 * 60,
      sweep_interval_secs: 60,
    }
  }
}

/// Parse a TOML document into `TutorConfig`.
pub fn parse_tutor_config(s: &str) -> Result<TutorConfig, toml::de::Error> {
  toml::from_str::<TutorConfig>(s)
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_tutor_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_tutor_config(&s) {
      Ok(cfg) => {
        info!(target: "pocitadlo_backend", %path, "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "pocitadlo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "pocitadlo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let cfg = parse_tutor_config("").unwrap();
    assert_eq!(cfg.policy.start_difficulty, Difficulty::MIN);
    assert_eq!(cfg.policy.promote_after, 5);
    assert_eq!(cfg.policy.demote_after_wrong, 3);
    assert_eq!(cfg.stats.recent_limit, 10);
    assert_eq!(cfg.retention.problem_ttl_secs, 1800);
    assert_eq!(cfg.retention.session_idle_secs, 7200);
  }

  #[test]
  fn retention_can_be_tuned() {
    let cfg = parse_tutor_config("[retention]\nproblem_ttl_secs = 5\n").unwrap();
    assert_eq!(cfg.retention.problem_ttl_secs, 5);
    assert_eq!(cfg.retention.sweep_interval_secs, 60);
  }

  #[test]
  fn partial_sections_keep_other_defaults() {
    let cfg = parse_tutor_config("[policy]\npromote_after = 3\nstart_difficulty = 2\n").unwrap();
    assert_eq!(cfg.policy.promote_after, 3);
    assert_eq!(cfg.policy.start_difficulty.get(), 2);
    assert_eq!(cfg.policy.solution_after_wrong, 2);
  }

  #[test]
  fn out_of_range_start_difficulty_is_rejected() {
    assert!(parse_tutor_config("[policy]\nstart_difficulty = 4\n").is_err());
  }
}
