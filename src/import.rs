use std::io::Read;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{GradeFilter, NewGrade, ScoreEntry};
use crate::store::GradeStore;

#[derive(Debug, Deserialize)]
struct CsvRow {
    learner_id: i64,
    class_id: i64,
    #[serde(rename = "type")]
    kind: String,
    score: f64,
}

/// Appends each CSV row's score to the first record of that learner in that
/// class, creating the record when there is none. Returns the number of
/// imported scores.
pub async fn import_csv<R: Read>(store: &dyn GradeStore, source: R) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_reader(source);
    let mut imported = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV row {}", line + 1))?;
        let entry = ScoreEntry {
            kind: Some(row.kind),
            score: serde_json::json!(row.score),
        };

        let filter = GradeFilter {
            learner_id: Some(row.learner_id),
            class_id: Some(row.class_id),
        };
        let existing = store.find(filter).await?;

        match existing.first() {
            Some(record) => {
                store.push_score(record.id, entry).await?;
            }
            None => {
                store
                    .insert(NewGrade {
                        learner_id: row.learner_id,
                        class_id: row.class_id,
                        scores: vec![entry],
                    })
                    .await?;
            }
        }
        imported += 1;
    }

    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryGradeStore;
    use crate::models::ScoreType;

    #[tokio::test]
    async fn rows_are_grouped_into_learner_class_records() {
        let store = InMemoryGradeStore::new();
        let csv = "learner_id,class_id,type,score\n\
                   1,10,exam,90\n\
                   1,10,quiz,70\n\
                   2,10,homework,60\n\
                   1,11,exam,50\n";

        let imported = import_csv(&store, csv.as_bytes()).await.unwrap();
        assert_eq!(imported, 4);

        let class_10 = store.find(GradeFilter::class(10)).await.unwrap();
        assert_eq!(class_10.len(), 2);
        let first = class_10.iter().find(|r| r.learner_id == 1).unwrap();
        assert_eq!(
            first.scores,
            vec![
                ScoreEntry::new(ScoreType::Exam, 90.0),
                ScoreEntry::new(ScoreType::Quiz, 70.0),
            ]
        );
        assert_eq!(store.find(GradeFilter::learner(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bad_rows_report_their_position() {
        let store = InMemoryGradeStore::new();
        let csv = "learner_id,class_id,type,score\n1,10,exam,ninety\n";
        let err = import_csv(&store, csv.as_bytes()).await.unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
