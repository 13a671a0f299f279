use std::fmt::Write;

use chrono::NaiveDate;

use crate::class_average::compute_class_average;
use crate::models::{GradeRecord, LearnerStat};
use crate::stats;

pub fn rank_learners(records: &[GradeRecord], class_id: Option<i64>) -> Vec<LearnerStat> {
    let mut averages = stats::learner_averages(records, class_id);
    averages.sort_by(|a, b| b.avg.partial_cmp(&a.avg).unwrap_or(std::cmp::Ordering::Equal));
    averages
}

pub fn build_report(
    class_id: Option<i64>,
    generated_on: NaiveDate,
    records: &[GradeRecord],
    limit: usize,
) -> String {
    let summary = stats::compute_stats(records, class_id);
    let ranked = rank_learners(records, class_id);

    let mut output = String::new();
    let scope_label = match class_id {
        Some(id) => format!("class {id}"),
        None => "all classes".to_string(),
    };

    let _ = writeln!(output, "# Grade Report");
    let _ = writeln!(output, "Generated for {} on {}", scope_label, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Pass Rate");

    if summary.total_learners == 0 {
        let _ = writeln!(output, "No scored learners in this scope.");
    } else {
        let _ = writeln!(
            output,
            "- {} of {} learners above 50 ({:.1}%)",
            summary.learners_above50, summary.total_learners, summary.percentage_above50
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Learner Averages");

    if ranked.is_empty() {
        let _ = writeln!(output, "No scored learners in this scope.");
    } else {
        for stat in ranked.iter().take(limit) {
            let _ = writeln!(output, "- learner {}: {:.2}", stat.learner_id, stat.avg);
        }
    }

    if let Some(id) = class_id {
        let in_class: Vec<GradeRecord> = records
            .iter()
            .filter(|r| r.class_id == id)
            .cloned()
            .collect();
        let _ = writeln!(output);
        let _ = writeln!(output, "## Class Average");
        match compute_class_average(&in_class) {
            Ok(average) => {
                let _ = writeln!(output, "- {:.2}", average);
            }
            Err(err) => {
                let _ = writeln!(output, "- unavailable: {}", err);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoreEntry, ScoreType};
    use uuid::Uuid;

    fn record(learner_id: i64, class_id: i64, scores: Vec<ScoreEntry>) -> GradeRecord {
        GradeRecord {
            id: Uuid::new_v4(),
            learner_id,
            class_id,
            scores,
        }
    }

    fn report_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("date")
    }

    #[test]
    fn learners_are_ranked_highest_first() {
        let records = vec![
            record(1, 10, vec![ScoreEntry::new(ScoreType::Quiz, 80.0)]),
            record(2, 10, vec![ScoreEntry::new(ScoreType::Exam, 80.0)]),
        ];
        let ranked = rank_learners(&records, None);
        assert_eq!(ranked[0].learner_id, 2);
        assert_eq!(ranked[1].learner_id, 1);
    }

    #[test]
    fn class_report_includes_average() {
        let records = vec![
            record(
                1,
                10,
                vec![
                    ScoreEntry::new(ScoreType::Exam, 90.0),
                    ScoreEntry::new(ScoreType::Exam, 80.0),
                    ScoreEntry::new(ScoreType::Quiz, 70.0),
                ],
            ),
            record(2, 10, vec![ScoreEntry::new(ScoreType::Homework, 60.0)]),
            record(3, 11, vec![ScoreEntry::new(ScoreType::Exam, 100.0)]),
        ];

        let report = build_report(Some(10), report_date(), &records, 10);
        assert!(report.contains("Generated for class 10 on 2026-03-02"));
        assert!(report.contains("1 of 2 learners above 50 (50.0%)"));
        assert!(report.contains("## Class Average\n- 67.00"));
        assert!(!report.contains("learner 3"));
    }

    #[test]
    fn empty_class_report_explains_missing_average() {
        let report = build_report(Some(4), report_date(), &[], 10);
        assert!(report.contains("No scored learners in this scope."));
        assert!(report.contains("- unavailable: Not found"));
    }

    #[test]
    fn global_report_has_no_class_average() {
        let records = vec![record(1, 10, vec![ScoreEntry::new(ScoreType::Exam, 40.0)])];
        let report = build_report(None, report_date(), &records, 10);
        assert!(report.contains("Generated for all classes"));
        assert!(!report.contains("## Class Average"));
    }
}
