use crate::error::GradeError;
use crate::models::{GradeRecord, ScoreType};
use crate::weights::{EXAM_WEIGHT, HOMEWORK_WEIGHT, QUIZ_WEIGHT};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct CategoryTotals {
    exam: f64,
    homework: f64,
    quiz: f64,
}

impl CategoryTotals {
    fn from_record(record: &GradeRecord) -> Self {
        let mut totals = Self::default();
        for (kind, value) in record.scores.iter().filter_map(|s| s.typed_value()) {
            match kind {
                ScoreType::Exam => totals.exam += value,
                ScoreType::Homework => totals.homework += value,
                ScoreType::Quiz => totals.quiz += value,
            }
        }
        totals
    }

    fn has_positive(&self) -> bool {
        self.exam > 0.0 || self.homework > 0.0 || self.quiz > 0.0
    }

    fn weighted(&self) -> f64 {
        self.exam * EXAM_WEIGHT + self.homework * HOMEWORK_WEIGHT + self.quiz * QUIZ_WEIGHT
    }
}

/// Weighted class average over raw category *sums* per record.
///
/// Records whose three sums are all zero or negative do not count toward the
/// denominator. Unlike [`crate::stats::learner_averages`], scores inside a
/// category are added up, not averaged.
pub fn compute_class_average(records: &[GradeRecord]) -> Result<f64, GradeError> {
    if records.is_empty() {
        return Err(GradeError::NotFound);
    }

    let mut total_weighted = 0.0;
    let mut total_students = 0usize;

    for record in records {
        let totals = CategoryTotals::from_record(record);
        if !totals.has_positive() {
            continue;
        }
        total_weighted += totals.weighted();
        total_students += 1;
    }

    if total_students == 0 {
        return Err(GradeError::NoValidScores);
    }

    Ok(total_weighted / total_students as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreEntry;
    use serde_json::json;
    use uuid::Uuid;

    fn record(learner_id: i64, scores: Vec<ScoreEntry>) -> GradeRecord {
        GradeRecord {
            id: Uuid::new_v4(),
            learner_id,
            class_id: 7,
            scores,
        }
    }

    #[test]
    fn empty_class_is_not_found() {
        assert!(matches!(
            compute_class_average(&[]),
            Err(GradeError::NotFound)
        ));
    }

    #[test]
    fn zero_and_missing_scores_are_not_valid() {
        let records = vec![
            record(1, vec![]),
            record(2, vec![ScoreEntry::new(ScoreType::Exam, 0.0)]),
            record(
                3,
                vec![ScoreEntry {
                    kind: None,
                    score: json!(88),
                }],
            ),
        ];
        assert!(matches!(
            compute_class_average(&records),
            Err(GradeError::NoValidScores)
        ));
    }

    #[test]
    fn sums_are_weighted_and_averaged_over_scoring_learners() {
        let records = vec![
            record(
                1,
                vec![
                    ScoreEntry::new(ScoreType::Exam, 90.0),
                    ScoreEntry::new(ScoreType::Exam, 80.0),
                    ScoreEntry::new(ScoreType::Quiz, 70.0),
                ],
            ),
            record(2, vec![ScoreEntry::new(ScoreType::Homework, 60.0)]),
        ];
        let average = compute_class_average(&records).expect("average");
        assert!((average - 67.0).abs() < 1e-9);
    }

    #[test]
    fn learners_without_positive_sums_are_left_out_of_the_denominator() {
        let records = vec![
            record(1, vec![ScoreEntry::new(ScoreType::Exam, 100.0)]),
            record(2, vec![ScoreEntry::new(ScoreType::Quiz, 0.0)]),
        ];
        let average = compute_class_average(&records).expect("average");
        assert!((average - 65.0).abs() < 1e-9);
    }

    #[test]
    fn non_numeric_and_unknown_entries_are_skipped() {
        let records = vec![record(
            1,
            vec![
                ScoreEntry::new(ScoreType::Quiz, 40.0),
                ScoreEntry {
                    kind: Some("exam".to_string()),
                    score: json!("ninety"),
                },
                ScoreEntry {
                    kind: Some("project".to_string()),
                    score: json!(100),
                },
            ],
        )];
        let average = compute_class_average(&records).expect("average");
        assert!((average - 10.0).abs() < 1e-9);
    }

    #[test]
    fn differs_from_the_mean_based_learner_average() {
        let records = vec![record(
            1,
            vec![
                ScoreEntry::new(ScoreType::Exam, 50.0),
                ScoreEntry::new(ScoreType::Exam, 50.0),
            ],
        )];
        let class_average = compute_class_average(&records).expect("average");
        let learner = crate::stats::learner_averages(&records, None);
        assert!((class_average - 65.0).abs() < 1e-9);
        assert!((learner[0].avg - 32.5).abs() < 1e-9);
    }
}
