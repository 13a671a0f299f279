use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{GradeFilter, GradeRecord, NewGrade, ScoreEntry, ScoreType};
use crate::store::GradeStore;

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let grades = vec![
        (
            Uuid::parse_str("5b1f3c2e-7a0d-4c8e-9f21-6d4b8a1e0c37")?,
            101,
            330,
            vec![
                ScoreEntry::new(ScoreType::Exam, 88.0),
                ScoreEntry::new(ScoreType::Quiz, 72.0),
                ScoreEntry::new(ScoreType::Homework, 95.0),
            ],
        ),
        (
            Uuid::parse_str("9e64a0d1-2b7f-4f3a-8c55-13e9d7b2f604")?,
            102,
            330,
            vec![
                ScoreEntry::new(ScoreType::Exam, 41.0),
                ScoreEntry::new(ScoreType::Quiz, 55.0),
            ],
        ),
        (
            Uuid::parse_str("c3d87f25-0e4a-4b19-a6f2-8b70c15d9e4a")?,
            103,
            331,
            vec![ScoreEntry::new(ScoreType::Homework, 64.0)],
        ),
    ];

    for (id, learner_id, class_id, scores) in grades {
        sqlx::query(
            r#"
            INSERT INTO gradebook.grades (id, learner_id, class_id, scores)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(learner_id as i64)
        .bind(class_id as i64)
        .bind(Json(scores))
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[derive(sqlx::FromRow)]
struct GradeRow {
    id: Uuid,
    learner_id: i64,
    class_id: i64,
    scores: Json<Vec<ScoreEntry>>,
}

impl From<GradeRow> for GradeRecord {
    fn from(row: GradeRow) -> Self {
        GradeRecord {
            id: row.id,
            learner_id: row.learner_id,
            class_id: row.class_id,
            scores: row.scores.0,
        }
    }
}

#[derive(Clone)]
pub struct PgGradeStore {
    pool: PgPool,
}

impl PgGradeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GradeStore for PgGradeStore {
    async fn insert(&self, grade: NewGrade) -> anyhow::Result<GradeRecord> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO gradebook.grades (id, learner_id, class_id, scores)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(grade.learner_id)
        .bind(grade.class_id)
        .bind(Json(&grade.scores))
        .execute(&self.pool)
        .await
        .context("failed to insert grade")?;

        Ok(GradeRecord {
            id,
            learner_id: grade.learner_id,
            class_id: grade.class_id,
            scores: grade.scores,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<GradeRecord>> {
        let row: Option<GradeRow> = sqlx::query_as(
            "SELECT id, learner_id, class_id, scores FROM gradebook.grades WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GradeRecord::from))
    }

    async fn find(&self, filter: GradeFilter) -> anyhow::Result<Vec<GradeRecord>> {
        let mut query = String::from(
            "SELECT id, learner_id, class_id, scores FROM gradebook.grades WHERE TRUE",
        );
        let mut position = 0;

        if filter.learner_id.is_some() {
            position += 1;
            query.push_str(&format!(" AND learner_id = ${position}"));
        }
        if filter.class_id.is_some() {
            position += 1;
            query.push_str(&format!(" AND class_id = ${position}"));
        }
        query.push_str(" ORDER BY created_at, id");

        let mut rows = sqlx::query_as::<_, GradeRow>(&query);

        if let Some(value) = filter.learner_id {
            rows = rows.bind(value);
        }
        if let Some(value) = filter.class_id {
            rows = rows.bind(value);
        }

        let records = rows.fetch_all(&self.pool).await?;
        Ok(records.into_iter().map(GradeRecord::from).collect())
    }

    async fn push_score(&self, id: Uuid, entry: ScoreEntry) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "UPDATE gradebook.grades SET scores = scores || $2 WHERE id = $1",
        )
        .bind(id)
        .bind(Json(vec![entry]))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn pull_scores(&self, id: Uuid, pattern: &ScoreEntry) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(Json<Vec<ScoreEntry>>,)> =
            sqlx::query_as("SELECT scores FROM gradebook.grades WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((Json(mut scores),)) = row else {
            return Ok(0);
        };

        let before = scores.len();
        scores.retain(|entry| !entry.matches(pattern));
        if scores.len() == before {
            return Ok(0);
        }

        sqlx::query("UPDATE gradebook.grades SET scores = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(&scores))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(1)
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM gradebook.grades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_one_by_learner(&self, learner_id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM gradebook.grades
            WHERE id = (
                SELECT id FROM gradebook.grades
                WHERE learner_id = $1
                ORDER BY created_at, id
                LIMIT 1
            )
            "#,
        )
        .bind(learner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn move_class(&self, from: i64, to: i64) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "UPDATE gradebook.grades SET class_id = $2 WHERE class_id = $1 AND class_id <> $2",
        )
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_class(&self, class_id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM gradebook.grades WHERE class_id = $1")
            .bind(class_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
