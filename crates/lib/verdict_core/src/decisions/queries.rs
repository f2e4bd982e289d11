//! Decision database queries.

use sqlx::SqlitePool;

use super::patch::DecisionPatch;
use crate::models::decision::{Decision, NewDecision};
use crate::models::{from_micros, now_micros};

#[derive(sqlx::FromRow)]
struct DecisionRow {
    id: i64,
    title: String,
    description: String,
    status: String,
    workspace_id: i64,
    owner_id: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<DecisionRow> for Decision {
    fn from(row: DecisionRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            workspace_id: row.workspace_id,
            owner_id: row.owner_id,
            created_at: from_micros(row.created_at),
            updated_at: from_micros(row.updated_at),
        }
    }
}

/// Insert a decision and return the stored row.
pub async fn insert_decision(
    pool: &SqlitePool,
    workspace_id: i64,
    owner_id: i64,
    new: &NewDecision,
) -> Result<Decision, sqlx::Error> {
    let now = now_micros();
    let row = sqlx::query_as::<_, DecisionRow>(
        r#"
        INSERT INTO decisions (title, description, status, workspace_id, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, title, description, status, workspace_id, owner_id, created_at, updated_at
        "#,
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.status)
    .bind(workspace_id)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Fetch a decision by ID.
pub async fn get_decision(
    pool: &SqlitePool,
    decision_id: i64,
) -> Result<Option<Decision>, sqlx::Error> {
    let row = sqlx::query_as::<_, DecisionRow>(
        r#"
        SELECT id, title, description, status, workspace_id, owner_id, created_at, updated_at
        FROM decisions
        WHERE id = ?
        "#,
    )
    .bind(decision_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Decision::from))
}

/// Apply `patch` to the decision if `owner_id` owns it. Returns rows affected.
pub async fn apply_patch(
    pool: &SqlitePool,
    decision_id: i64,
    owner_id: i64,
    patch: &DecisionPatch,
) -> Result<u64, sqlx::Error> {
    let mut qb = patch.update_statement(decision_id, owner_id, now_micros());
    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}
