use axum::extract::{Path, State};
use axum::Json;

use crate::class_average::compute_class_average;
use crate::error::{ApiError, GradeError};
use crate::models::{ClassAverage, ClassStats, GradeFilter};
use crate::routes_grades::numeric_id;
use crate::state::SharedState;
use crate::stats::compute_stats;

async fn stats_for(state: &SharedState, class_id: Option<i64>) -> Result<ClassStats, ApiError> {
    let filter = GradeFilter {
        learner_id: None,
        class_id,
    };
    let records = state
        .store
        .find(filter)
        .await
        .map_err(|e| GradeError::AggregationFailure(format!("{e:#}")))?;

    Ok(compute_stats(&records, class_id))
}

pub async fn get_stats(State(state): State<SharedState>) -> Result<Json<ClassStats>, ApiError> {
    let stats = stats_for(&state, None).await?;
    tracing::info!(total = stats.total_learners, "computed stats");
    Ok(Json(stats))
}

pub async fn get_class_stats(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ClassStats>, ApiError> {
    tracing::info!(class = %id, "stats requested for class");
    let Some(class_id) = numeric_id(&id) else {
        return Ok(Json(ClassStats::default()));
    };
    Ok(Json(stats_for(&state, Some(class_id)).await?))
}

pub async fn get_class_average(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ClassAverage>, ApiError> {
    let class_id = numeric_id(&id).ok_or(GradeError::NotFound)?;
    tracing::info!(class_id, "querying class average");

    let records = state.store.find(GradeFilter::class(class_id)).await?;
    tracing::debug!(count = records.len(), "records found");

    let class_average = compute_class_average(&records)?;
    Ok(Json(ClassAverage { class_average }))
}
