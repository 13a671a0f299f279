use std::collections::BTreeMap;

use crate::models::{ClassStats, GradeRecord, LearnerStat, ScoreType};
use crate::weights::{EXAM_WEIGHT, HOMEWORK_WEIGHT, PASS_THRESHOLD, QUIZ_WEIGHT};

#[derive(Debug, Default)]
struct LearnerScores {
    exam: Vec<f64>,
    quiz: Vec<f64>,
    homework: Vec<f64>,
}

impl LearnerScores {
    fn push(&mut self, kind: ScoreType, value: f64) {
        match kind {
            ScoreType::Exam => self.exam.push(value),
            ScoreType::Quiz => self.quiz.push(value),
            ScoreType::Homework => self.homework.push(value),
        }
    }

    /// Categories without scores drop out of the sum instead of counting as
    /// zero, and the remaining weights are not rescaled.
    fn weighted_average(&self) -> f64 {
        [
            (mean(&self.exam), EXAM_WEIGHT),
            (mean(&self.quiz), QUIZ_WEIGHT),
            (mean(&self.homework), HOMEWORK_WEIGHT),
        ]
        .into_iter()
        .filter_map(|(avg, weight)| avg.map(|avg| avg * weight))
        .sum()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Weighted average per learner, ordered by learner id.
///
/// A learner is listed as soon as one of their records holds a score entry,
/// even if no entry has a recognized type and a numeric value; such a
/// learner averages 0.
pub fn learner_averages(records: &[GradeRecord], class_filter: Option<i64>) -> Vec<LearnerStat> {
    let mut learners: BTreeMap<i64, LearnerScores> = BTreeMap::new();

    for record in records {
        if class_filter.is_some_and(|class_id| record.class_id != class_id) {
            continue;
        }
        if record.scores.is_empty() {
            continue;
        }

        let entry = learners.entry(record.learner_id).or_default();
        for (kind, value) in record.scores.iter().filter_map(|s| s.typed_value()) {
            entry.push(kind, value);
        }
    }

    learners
        .into_iter()
        .map(|(learner_id, scores)| LearnerStat {
            learner_id,
            avg: scores.weighted_average(),
        })
        .collect()
}

pub fn compute_stats(records: &[GradeRecord], class_filter: Option<i64>) -> ClassStats {
    let averages = learner_averages(records, class_filter);
    summarize(&averages)
}

pub fn summarize(averages: &[LearnerStat]) -> ClassStats {
    let total_learners = averages.len();
    if total_learners == 0 {
        return ClassStats::default();
    }

    let learners_above50 = averages
        .iter()
        .filter(|stat| stat.avg > PASS_THRESHOLD)
        .count();

    ClassStats {
        total_learners,
        learners_above50,
        percentage_above50: learners_above50 as f64 / total_learners as f64 * 100.0,
    }
}
