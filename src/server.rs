use anyhow::Context;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::routes_grades as grades;
use crate::routes_stats as stats;
use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(grades::welcome))
        .route("/grades", post(grades::create_grade))
        .route("/grades/stats", get(stats::get_stats))
        .route("/grades/stats/:id", get(stats::get_class_stats))
        .route("/grades/student/:id", get(grades::student_redirect))
        .route(
            "/grades/learner/:id",
            get(grades::get_learner_grades).delete(grades::delete_learner_grade),
        )
        .route(
            "/grades/class/:id",
            get(grades::get_class_grades)
                .patch(grades::move_class)
                .delete(grades::delete_class),
        )
        .route("/grades/class/:id/average", get(stats::get_class_average))
        .route(
            "/grades/:id",
            get(grades::get_grade).delete(grades::delete_grade),
        )
        .route("/grades/:id/add", patch(grades::add_score))
        .route("/grades/:id/remove", patch(grades::remove_score))
        .with_state(state)
}

pub async fn serve(state: SharedState, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("Server is running on http://{bind_addr}");
    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}
