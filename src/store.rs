use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{GradeFilter, GradeRecord, NewGrade, ScoreEntry};

/// Persistence for grade records. Write operations return how many records
/// they changed so callers can tell "nothing matched" apart from success.
#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn insert(&self, grade: NewGrade) -> anyhow::Result<GradeRecord>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<GradeRecord>>;

    async fn find(&self, filter: GradeFilter) -> anyhow::Result<Vec<GradeRecord>>;

    async fn push_score(&self, id: Uuid, entry: ScoreEntry) -> anyhow::Result<u64>;

    /// Removes every entry of the record matching `pattern` (see [`ScoreEntry::matches`]).
    async fn pull_scores(&self, id: Uuid, pattern: &ScoreEntry) -> anyhow::Result<u64>;

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<u64>;

    /// Deletes the oldest record of the learner, if any.
    async fn delete_one_by_learner(&self, learner_id: i64) -> anyhow::Result<u64>;

    /// Counts only records whose class id actually changed.
    async fn move_class(&self, from: i64, to: i64) -> anyhow::Result<u64>;

    async fn delete_class(&self, class_id: i64) -> anyhow::Result<u64>;
}
