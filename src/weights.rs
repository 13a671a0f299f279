pub const EXAM_WEIGHT: f64 = 0.65;
pub const QUIZ_WEIGHT: f64 = 0.25;
pub const HOMEWORK_WEIGHT: f64 = 0.10;

pub const PASS_THRESHOLD: f64 = 50.0;
