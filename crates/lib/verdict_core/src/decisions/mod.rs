//! Decisions: creation by workspace members, partial updates by their owner.
//!
//! An update is scoped by both decision ID and owner ID. A decision that
//! exists but belongs to someone else is reported exactly like a missing
//! one, so non-owners learn nothing about it.

pub mod patch;
pub mod queries;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::access::{AccessError, required, resolve_requester};
use crate::models::auth::Identity;
use crate::models::decision::{Decision, NewDecision};
use crate::workspaces;
pub use patch::{DecisionField, DecisionPatch};

/// Create a decision inside a workspace the requester belongs to.
pub async fn create_decision(
    pool: &SqlitePool,
    identity: &Identity,
    workspace_id: i64,
    title: &str,
    description: &str,
    status: &str,
) -> Result<Decision, AccessError> {
    let owner_id = resolve_requester(pool, identity).await?;
    workspaces::require_member(pool, workspace_id, owner_id).await?;

    let new = NewDecision {
        title: required(title, "Title")?,
        description: required(description, "Description")?,
        status: required(status, "Status")?,
    };

    let decision = queries::insert_decision(pool, workspace_id, owner_id, &new).await?;
    info!(decision_id = decision.id, workspace_id, owner_id, "decision created");
    Ok(decision)
}

/// Apply a partial update to a decision the requester owns and return the
/// current row.
pub async fn update_decision(
    pool: &SqlitePool,
    identity: &Identity,
    decision_id: i64,
    patch: &DecisionPatch,
) -> Result<Decision, AccessError> {
    let owner_id = resolve_requester(pool, identity).await?;

    let affected = queries::apply_patch(pool, decision_id, owner_id, patch).await?;
    if affected == 0 {
        debug!(decision_id, owner_id, "decision update matched no owned row");
        return Err(AccessError::NotFound("Decision not found".into()));
    }
    info!(decision_id, owner_id, fields = ?patch.fields().collect::<Vec<_>>(), "decision updated");

    queries::get_decision(pool, decision_id)
        .await?
        .ok_or_else(|| AccessError::NotFound("Decision not found".into()))
}
