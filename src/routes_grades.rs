use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{GradeFilter, GradeRecord, NewGradeRequest, ScoreEntry, WriteSummary};
use crate::state::SharedState;

/// Record ids must be given in canonical form; anything `Uuid` only accepts
/// leniently (braces, uppercase, no hyphens) is rejected.
pub fn record_id(raw: &str) -> Result<Uuid, ApiError> {
    match Uuid::parse_str(raw) {
        Ok(id) if id.to_string() == raw => Ok(id),
        _ => Err(ApiError::InvalidId),
    }
}

/// Numeric path or query value. Text that is not a number matches no record.
pub fn numeric_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn modified(count: u64) -> Result<Json<WriteSummary>, ApiError> {
    if count == 0 {
        Err(ApiError::NotFound)
    } else {
        Ok(Json(WriteSummary::modified(count)))
    }
}

fn deleted(count: u64) -> Result<Json<WriteSummary>, ApiError> {
    if count == 0 {
        Err(ApiError::NotFound)
    } else {
        Ok(Json(WriteSummary::deleted(count)))
    }
}

fn non_empty(records: Vec<GradeRecord>) -> Result<Json<Vec<GradeRecord>>, ApiError> {
    if records.is_empty() {
        Err(ApiError::NotFound)
    } else {
        Ok(Json(records))
    }
}

pub async fn welcome() -> &'static str {
    "Welcome to the API."
}

pub async fn create_grade(
    State(state): State<SharedState>,
    Json(req): Json<NewGradeRequest>,
) -> Result<(StatusCode, Json<GradeRecord>), ApiError> {
    let grade = req
        .into_new_grade()
        .ok_or_else(|| ApiError::BadRequest("learner_id and class_id are required".to_string()))?;
    let record = state.store.insert(grade).await?;
    tracing::info!(id = %record.id, learner_id = record.learner_id, "grade created");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_grade(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GradeRecord>, ApiError> {
    let id = record_id(&id)?;
    state
        .store
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn add_score(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(entry): Json<ScoreEntry>,
) -> Result<Json<WriteSummary>, ApiError> {
    let id = record_id(&id)?;
    modified(state.store.push_score(id, entry).await?)
}

pub async fn remove_score(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(pattern): Json<ScoreEntry>,
) -> Result<Json<WriteSummary>, ApiError> {
    let id = record_id(&id)?;
    modified(state.store.pull_scores(id, &pattern).await?)
}

pub async fn delete_grade(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<WriteSummary>, ApiError> {
    let id = record_id(&id)?;
    deleted(state.store.delete_by_id(id).await?)
}

pub async fn student_redirect(Path(id): Path<String>) -> Redirect {
    Redirect::temporary(&format!("/grades/learner/{id}"))
}

#[derive(Debug, Default, Deserialize)]
pub struct LearnerQuery {
    pub class: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassQuery {
    pub learner: Option<String>,
}

pub async fn get_learner_grades(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LearnerQuery>,
) -> Result<Json<Vec<GradeRecord>>, ApiError> {
    let learner_id = numeric_id(&id).ok_or(ApiError::NotFound)?;
    let class_id = match query.class.as_deref() {
        Some(raw) => Some(numeric_id(raw).ok_or(ApiError::NotFound)?),
        None => None,
    };
    let filter = GradeFilter {
        learner_id: Some(learner_id),
        class_id,
    };
    non_empty(state.store.find(filter).await?)
}

pub async fn delete_learner_grade(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<WriteSummary>, ApiError> {
    let learner_id = numeric_id(&id).ok_or(ApiError::NotFound)?;
    deleted(state.store.delete_one_by_learner(learner_id).await?)
}

pub async fn get_class_grades(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<ClassQuery>,
) -> Result<Json<Vec<GradeRecord>>, ApiError> {
    let class_id = numeric_id(&id).ok_or(ApiError::NotFound)?;
    let learner_id = match query.learner.as_deref() {
        Some(raw) => Some(numeric_id(raw).ok_or(ApiError::NotFound)?),
        None => None,
    };
    let filter = GradeFilter {
        learner_id,
        class_id: Some(class_id),
    };
    non_empty(state.store.find(filter).await?)
}

#[derive(Debug, Deserialize)]
pub struct MoveClassRequest {
    pub class_id: i64,
}

pub async fn move_class(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<MoveClassRequest>,
) -> Result<Json<WriteSummary>, ApiError> {
    let class_id = numeric_id(&id).ok_or(ApiError::NotFound)?;
    modified(state.store.move_class(class_id, req.class_id).await?)
}

pub async fn delete_class(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<WriteSummary>, ApiError> {
    let class_id = numeric_id(&id).ok_or(ApiError::NotFound)?;
    deleted(state.store.delete_class(class_id).await?)
}
