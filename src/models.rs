use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreType {
    Exam,
    Homework,
    Quiz,
}

impl ScoreType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exam" => Some(Self::Exam),
            "homework" => Some(Self::Homework),
            "quiz" => Some(Self::Quiz),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Homework => "homework",
            Self::Quiz => "quiz",
        }
    }
}

/// A single score as stored. Both fields are kept verbatim so that entries
/// with an unknown type or a non-numeric score survive a round trip through
/// the store; the calculators skip them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub score: serde_json::Value,
}

impl ScoreEntry {
    pub fn new(kind: ScoreType, score: f64) -> Self {
        Self {
            kind: Some(kind.as_str().to_string()),
            score: serde_json::json!(score),
        }
    }

    pub fn category(&self) -> Option<ScoreType> {
        self.kind.as_deref().and_then(ScoreType::parse)
    }

    pub fn value(&self) -> Option<f64> {
        self.score.as_f64()
    }

    /// Recognized category and numeric value, or `None` when either is missing.
    pub fn typed_value(&self) -> Option<(ScoreType, f64)> {
        Some((self.category()?, self.value()?))
    }

    /// True when every field set on `pattern` equals the same field here.
    /// Numbers compare by value, so `80` matches `80.0`.
    pub fn matches(&self, pattern: &ScoreEntry) -> bool {
        let kind_matches = match &pattern.kind {
            Some(kind) => self.kind.as_ref() == Some(kind),
            None => true,
        };
        let score_matches = match (&pattern.score, pattern.score.as_f64()) {
            (serde_json::Value::Null, _) => true,
            (_, Some(expected)) => self.value() == Some(expected),
            (other, None) => &self.score == other,
        };
        kind_matches && score_matches
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: Uuid,
    pub learner_id: i64,
    pub class_id: i64,
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGrade {
    pub learner_id: i64,
    pub class_id: i64,
    pub scores: Vec<ScoreEntry>,
}

/// Request body for creating a record. `student_id` is the legacy name of
/// `learner_id` and wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGradeRequest {
    pub learner_id: Option<i64>,
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

impl NewGradeRequest {
    pub fn into_new_grade(self) -> Option<NewGrade> {
        Some(NewGrade {
            learner_id: self.student_id.or(self.learner_id)?,
            class_id: self.class_id?,
            scores: self.scores,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeFilter {
    pub learner_id: Option<i64>,
    pub class_id: Option<i64>,
}

impl GradeFilter {
    pub fn learner(learner_id: i64) -> Self {
        Self {
            learner_id: Some(learner_id),
            class_id: None,
        }
    }

    pub fn class(class_id: i64) -> Self {
        Self {
            learner_id: None,
            class_id: Some(class_id),
        }
    }

    pub fn matches(&self, record: &GradeRecord) -> bool {
        self.learner_id.map_or(true, |id| record.learner_id == id)
            && self.class_id.map_or(true, |id| record.class_id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerStat {
    pub learner_id: i64,
    pub avg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub total_learners: usize,
    pub learners_above50: usize,
    pub percentage_above50: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAverage {
    pub class_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteSummary {
    pub acknowledged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
}

impl WriteSummary {
    pub fn modified(count: u64) -> Self {
        Self {
            acknowledged: true,
            modified_count: Some(count),
            deleted_count: None,
        }
    }

    pub fn deleted(count: u64) -> Self {
        Self {
            acknowledged: true,
            modified_count: None,
            deleted_count: Some(count),
        }
    }
}
