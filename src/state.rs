//! Application state: issued problems, practice sessions, badges, the
//! exercise store and the loaded configuration.
//!
//! This module owns:
//!   - open problems by id (at most one per session; a problem stays open
//!     until solved, revealed, replaced or expired)
//!   - per-session, per-topic difficulty controllers
//!   - badges earned per session
//!   - the exercise store (in-memory by default)
//!   - the tutor config (from TOML or defaults)

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{load_tutor_config_from_env, TutorConfig};
use crate::difficulty::DifficultyController;
use crate::domain::{Difficulty, ExerciseRecord, GeneratedProblem, Topic};
use crate::progress::{award_badges, Badge, BadgeType};
use crate::store::{ExerciseStore, MemoryExerciseStore};

/// A problem handed out and not yet retired.
#[derive(Clone, Debug)]
pub struct IssuedProblem {
    pub problem: GeneratedProblem,
    pub session_id: String,
    pub difficulty: Difficulty,
    pub issued_at: Instant,
    pub wrong_attempts: u32,
}

/// One child's practice run: a difficulty controller per topic.
#[derive(Clone, Debug)]
pub struct PracticeSession {
    controllers: HashMap<Topic, DifficultyController>,
    last_seen: Instant,
}

impl PracticeSession {
    fn new() -> Self {
        Self { controllers: HashMap::new(), last_seen: Instant::now() }
    }

    pub fn controller(&mut self, topic: Topic, start: Difficulty) -> &mut DifficultyController {
        self.controllers
            .entry(topic)
            .or_insert_with(|| DifficultyController::new(start))
    }
}

/// Look up (or open) a session and mark it as active.
fn active_session<'a>(sessions: &'a mut HashMap<String, PracticeSession>, session_id: &str) -> &'a mut PracticeSession {
    let session = sessions
        .entry(session_id.to_string())
        .or_insert_with(PracticeSession::new);
    session.last_seen = Instant::now();
    session
}

/// What a sweep or a session teardown removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Released {
    pub problems: usize,
    pub sessions: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub problems: Arc<RwLock<HashMap<String, IssuedProblem>>>,
    pub sessions: Arc<RwLock<HashMap<String, PracticeSession>>>,
    pub badges: Arc<RwLock<HashMap<String, Vec<Badge>>>>,
    pub exercises: Arc<dyn ExerciseStore>,
    pub config: TutorConfig,
}

impl AppState {
    /// Build state from env: load config, start with an empty in-memory store.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_tutor_config_from_env().unwrap_or_default();
        info!(
            target: "pocitadlo_backend",
            start = %config.policy.start_difficulty,
            promote_after = config.policy.promote_after,
            demote_after_wrong = config.policy.demote_after_wrong,
            problem_ttl_secs = config.retention.problem_ttl_secs,
            "Difficulty policy ready"
        );
        Self::with_store(config, Arc::new(MemoryExerciseStore::new()))
    }

    pub fn with_store(config: TutorConfig, exercises: Arc<dyn ExerciseStore>) -> Self {
        Self {
            problems: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            badges: Arc::new(RwLock::new(HashMap::new())),
            exercises,
            config,
        }
    }

    /// Level the session's controller currently suggests for `topic`.
    pub async fn suggested_difficulty(&self, session_id: &str, topic: Topic) -> Difficulty {
        let start = self.config.policy.start_difficulty;
        let mut sessions = self.sessions.write().await;
        active_session(&mut sessions, session_id).controller(topic, start).current()
    }

    /// Feed a graded answer to the session's controller; returns the next level.
    #[instrument(level = "debug", skip(self), fields(%session_id, %topic))]
    pub async fn record_result(&self, session_id: &str, topic: Topic, correct: bool, wrong_attempts: u32) -> Difficulty {
        let policy = &self.config.policy;
        let mut sessions = self.sessions.write().await;
        let controller = active_session(&mut sessions, session_id).controller(topic, policy.start_difficulty);
        let before = controller.current();
        let next = if correct {
            controller.record_correct(policy)
        } else {
            controller.record_wrong(policy, wrong_attempts)
        };
        if next != before {
            info!(target: "practice", %session_id, %topic, from = %before, to = %next, "Difficulty adjusted");
        } else {
            debug!(target: "practice", %session_id, %topic, level = %next, streak = controller.streak(), "Difficulty unchanged");
        }
        next
    }

    /// Remember a freshly generated problem; returns its id. Any problem the
    /// session left unanswered is retired.
    #[instrument(level = "debug", skip(self, problem), fields(%session_id, %difficulty))]
    pub async fn issue_problem(&self, session_id: &str, difficulty: Difficulty, problem: GeneratedProblem) -> String {
        let id = Uuid::new_v4().to_string();
        let issued = IssuedProblem {
            problem,
            session_id: session_id.to_string(),
            difficulty,
            issued_at: Instant::now(),
            wrong_attempts: 0,
        };
        let mut problems = self.problems.write().await;
        let before = problems.len();
        problems.retain(|_, p| p.session_id != session_id);
        let replaced = before - problems.len();
        problems.insert(id.clone(), issued);
        debug!(target: "practice", %id, replaced, "Problem issued");
        id
    }

    /// Read-only access to an open problem by id.
    #[cfg(test)]
    pub async fn get_problem(&self, id: &str) -> Option<IssuedProblem> {
        self.problems.read().await.get(id).cloned()
    }

    /// Close a problem; returns it if it was open.
    pub async fn retire_problem(&self, id: &str) -> Option<IssuedProblem> {
        self.problems.write().await.remove(id)
    }

    /// Award whatever `history` newly qualifies for; returns the new badges.
    pub async fn grant_badges(&self, session_id: &str, history: &[ExerciseRecord], now: DateTime<Utc>) -> Vec<BadgeType> {
        let mut badges = self.badges.write().await;
        let held_list = badges.entry(session_id.to_string()).or_default();
        let held: BTreeSet<BadgeType> = held_list.iter().map(|b| b.badge_type).collect();
        let earned = award_badges(history, &held, now);
        held_list.extend(earned.iter().map(|&badge_type| Badge { badge_type, earned_at: now }));
        if !earned.is_empty() {
            info!(target: "practice", %session_id, ?earned, "Badges earned");
        }
        earned
    }

    /// Badges a session holds, in the order they were earned.
    pub async fn badges_of(&self, session_id: &str) -> Vec<Badge> {
        self.badges.read().await.get(session_id).cloned().unwrap_or_default()
    }

    /// Drop everything kept in memory for a session that has ended.
    /// Recorded exercises stay in the store.
    #[instrument(level = "debug", skip(self))]
    pub async fn end_session(&self, session_id: &str) -> Released {
        let problems = {
            let mut problems = self.problems.write().await;
            let before = problems.len();
            problems.retain(|_, p| p.session_id != session_id);
            before - problems.len()
        };
        let sessions = usize::from(self.sessions.write().await.remove(session_id).is_some());
        self.badges.write().await.remove(session_id);
        let released = Released { problems, sessions };
        debug!(target: "practice", %session_id, ?released, "Session ended");
        released
    }

    /// Expire problems older than the problem TTL and sessions idle longer
    /// than the session timeout, as seen at `now`.
    pub async fn prune_idle(&self, now: Instant) -> Released {
        let retention = &self.config.retention;
        let problem_ttl = Duration::from_secs(retention.problem_ttl_secs);
        let session_idle = Duration::from_secs(retention.session_idle_secs);

        let problems = {
            let mut problems = self.problems.write().await;
            let before = problems.len();
            problems.retain(|_, p| now.saturating_duration_since(p.issued_at) < problem_ttl);
            before - problems.len()
        };
        let sessions = {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, s| now.saturating_duration_since(s.last_seen) < session_idle);
            before - sessions.len()
        };
        Released { problems, sessions }
    }
}

/// Periodically expire abandoned problems and idle sessions.
pub fn spawn_sweeper(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let every = Duration::from_secs(state.config.retention.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let released = state.prune_idle(Instant::now()).await;
            if released != Released::default() {
                info!(
                    target: "pocitadlo_backend",
                    problems = released.problems,
                    sessions = released.sessions,
                    "Expired idle practice state"
                );
            }
        }
    })
}
