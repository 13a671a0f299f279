use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{GradeFilter, GradeRecord, NewGrade, ScoreEntry};
use crate::store::GradeStore;

/// Insertion-ordered store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryGradeStore {
    records: RwLock<Vec<GradeRecord>>,
}

impl InMemoryGradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<GradeRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl GradeStore for InMemoryGradeStore {
    async fn insert(&self, grade: NewGrade) -> anyhow::Result<GradeRecord> {
        let record = GradeRecord {
            id: Uuid::new_v4(),
            learner_id: grade.learner_id,
            class_id: grade.class_id,
            scores: grade.scores,
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<GradeRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find(&self, filter: GradeFilter) -> anyhow::Result<Vec<GradeRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn push_score(&self, id: Uuid, entry: ScoreEntry) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.scores.push(entry);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn pull_scores(&self, id: Uuid, pattern: &ScoreEntry) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(0);
        };
        let before = record.scores.len();
        record.scores.retain(|entry| !entry.matches(pattern));
        Ok(u64::from(record.scores.len() != before))
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok((before - records.len()) as u64)
    }

    async fn delete_one_by_learner(&self, learner_id: i64) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        match records.iter().position(|r| r.learner_id == learner_id) {
            Some(index) => {
                records.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn move_class(&self, from: i64, to: i64) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        let mut modified = 0;
        for record in records.iter_mut().filter(|r| r.class_id == from) {
            if record.class_id != to {
                record.class_id = to;
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn delete_class(&self, class_id: i64) -> anyhow::Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.class_id != class_id);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreType;

    fn grade(learner_id: i64, class_id: i64) -> NewGrade {
        NewGrade {
            learner_id,
            class_id,
            scores: vec![ScoreEntry::new(ScoreType::Quiz, 75.0)],
        }
    }

    #[tokio::test]
    async fn filters_by_learner_and_class() {
        let store = InMemoryGradeStore::new();
        store.insert(grade(1, 10)).await.unwrap();
        store.insert(grade(1, 20)).await.unwrap();
        store.insert(grade(2, 10)).await.unwrap();

        assert_eq!(store.find(GradeFilter::learner(1)).await.unwrap().len(), 2);
        assert_eq!(store.find(GradeFilter::class(10)).await.unwrap().len(), 2);
        let both = GradeFilter {
            learner_id: Some(1),
            class_id: Some(20),
        };
        assert_eq!(store.find(both).await.unwrap().len(), 1);
        assert_eq!(store.find(GradeFilter::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn push_and_pull_scores() {
        let store = InMemoryGradeStore::new();
        let record = store.insert(grade(1, 10)).await.unwrap();

        let added = store
            .push_score(record.id, ScoreEntry::new(ScoreType::Exam, 60.0))
            .await
            .unwrap();
        assert_eq!(added, 1);

        let removed = store
            .pull_scores(record.id, &ScoreEntry::new(ScoreType::Quiz, 75.0))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let stored = store.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.scores, vec![ScoreEntry::new(ScoreType::Exam, 60.0)]);

        let missing = store
            .pull_scores(record.id, &ScoreEntry::new(ScoreType::Quiz, 75.0))
            .await
            .unwrap();
        assert_eq!(missing, 0);
        assert_eq!(
            store
                .push_score(Uuid::new_v4(), ScoreEntry::default())
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn deleting_by_learner_removes_one_record() {
        let store = InMemoryGradeStore::new();
        store.insert(grade(1, 10)).await.unwrap();
        store.insert(grade(1, 20)).await.unwrap();

        assert_eq!(store.delete_one_by_learner(1).await.unwrap(), 1);
        let left = store.find(GradeFilter::learner(1)).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].class_id, 20);
        assert_eq!(store.delete_one_by_learner(9).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn moving_a_class_onto_itself_modifies_nothing() {
        let store = InMemoryGradeStore::new();
        store.insert(grade(1, 10)).await.unwrap();
        store.insert(grade(2, 10)).await.unwrap();

        assert_eq!(store.move_class(10, 10).await.unwrap(), 0);
        assert_eq!(store.move_class(10, 11).await.unwrap(), 2);
        assert_eq!(store.delete_class(11).await.unwrap(), 2);
        assert_eq!(store.delete_class(11).await.unwrap(), 0);
    }
}
