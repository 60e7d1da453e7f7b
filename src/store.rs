//! Data-access seam for graded exercises.
//!
//! The practice flow only needs to append records and read a session's
//! history back. `MemoryExerciseStore` keeps everything in process; a
//! relational store can be slotted in behind the same trait.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::ExerciseRecord;
use crate::error::Result;

#[async_trait]
pub trait ExerciseStore: Send + Sync {
    /// Persist one graded submission.
    async fn save(&self, record: ExerciseRecord) -> Result<()>;

    /// All records of a session, oldest first.
    async fn for_session(&self, session_id: &str) -> Result<Vec<ExerciseRecord>>;

    /// Up to `limit` records of a session, newest first, skipping the
    /// `offset` newest.
    async fn recent(&self, session_id: &str, offset: usize, limit: usize) -> Result<Vec<ExerciseRecord>> {
        let all = self.for_session(session_id).await?;
        Ok(all.into_iter().rev().skip(offset).take(limit).collect())
    }
}

#[derive(Default)]
pub struct MemoryExerciseStore {
    records: RwLock<Vec<ExerciseRecord>>,
}

impl MemoryExerciseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExerciseStore for MemoryExerciseStore {
    #[instrument(level = "debug", skip(self, record), fields(id = %record.id, session = %record.session_id))]
    async fn save(&self, record: ExerciseRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record);
        debug!(target: "practice", total = records.len(), "Exercise stored");
        Ok(())
    }

    async fn for_session(&self, session_id: &str) -> Result<Vec<ExerciseRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.session_id == session_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, GeneratedProblem, Notation, Operator, Topic};
    use chrono::Utc;

    fn record(id: &str, session: &str) -> ExerciseRecord {
        let p = GeneratedProblem::new(41, 38, Operator::Plus, Notation::Inline).unwrap();
        ExerciseRecord {
            id: id.into(),
            session_id: session.into(),
            topic: Topic::Addition,
            difficulty: Difficulty::MIN,
            problem: p.data(),
            user_answer: "79".into(),
            correct_answer: p.correct_answer(),
            is_correct: true,
            error_type: None,
            time_spent_seconds: 3,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sessions_are_kept_apart() {
        let store = MemoryExerciseStore::new();
        store.save(record("a", "s1")).await.unwrap();
        store.save(record("b", "s2")).await.unwrap();
        store.save(record("c", "s1")).await.unwrap();

        let ids: Vec<_> = store.for_session("s1").await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(store.for_session("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let store = MemoryExerciseStore::new();
        for id in ["a", "b", "c"] {
            store.save(record(id, "s")).await.unwrap();
        }
        let ids: Vec<_> = store.recent("s", 0, 2).await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn recent_pages_with_offset() {
        let store = MemoryExerciseStore::new();
        for id in ["a", "b", "c", "d"] {
            store.save(record(id, "s")).await.unwrap();
        }
        let ids: Vec<_> = store.recent("s", 1, 2).await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert!(store.recent("s", 10, 5).await.unwrap().is_empty());
    }
}
