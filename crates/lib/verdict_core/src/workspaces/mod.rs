//! Workspace creation, membership and the membership gate for decisions.
//!
//! Rules:
//! - any authenticated user may create a workspace and becomes its owner;
//! - only the owner may add members, and re-adding a member is a no-op;
//! - the owner counts as a member everywhere membership is checked.

pub mod queries;

use sqlx::SqlitePool;
use tracing::info;

use crate::access::{AccessError, required, resolve_requester};
use crate::auth::email;
use crate::auth::queries::find_user_id_by_email;
use crate::models::auth::Identity;
use crate::models::workspace::{MemberRole, Workspace, WorkspaceMember, WorkspaceSummary};

/// Create a workspace owned by the requester.
pub async fn create_workspace(
    pool: &SqlitePool,
    identity: &Identity,
    name: &str,
) -> Result<Workspace, AccessError> {
    let name = required(name, "Workspace name")?;
    let owner_id = resolve_requester(pool, identity).await?;

    let workspace_id = queries::insert_workspace_with_owner(pool, &name, owner_id).await?;
    info!(workspace_id, owner_id, "workspace created");

    queries::get_workspace(pool, workspace_id)
        .await?
        .ok_or_else(|| AccessError::NotFound("Workspace not found".into()))
}

/// Add the user registered under `member_email` to a workspace.
///
/// Checks run in order: requester resolves → workspace exists → requester
/// owns it → email present → invitee exists.
pub async fn add_member(
    pool: &SqlitePool,
    identity: &Identity,
    workspace_id: i64,
    member_email: &str,
) -> Result<WorkspaceMember, AccessError> {
    let requester_id = resolve_requester(pool, identity).await?;

    let owner_id = queries::owner_of(pool, workspace_id)
        .await?
        .ok_or_else(|| AccessError::NotFound("Workspace not found".into()))?;
    if owner_id != requester_id {
        info!(workspace_id, requester_id, "member addition refused: not owner");
        return Err(AccessError::Forbidden(
            "Only workspace owner can add members".into(),
        ));
    }

    let member_email = email::normalize(member_email);
    if member_email.is_empty() {
        return Err(AccessError::Validation("Member email is required".into()));
    }
    let member_id = find_user_id_by_email(pool, &member_email)
        .await?
        .ok_or_else(|| AccessError::NotFound("User not found".into()))?;

    queries::insert_member_if_absent(pool, workspace_id, member_id, MemberRole::Member).await?;
    info!(workspace_id, member_id, "workspace member added");

    queries::get_membership(pool, workspace_id, member_id)
        .await?
        .ok_or_else(|| AccessError::NotFound("Membership not found".into()))
}

/// Every workspace the requester belongs to.
pub async fn list_workspaces(
    pool: &SqlitePool,
    identity: &Identity,
) -> Result<Vec<WorkspaceSummary>, AccessError> {
    let user_id = resolve_requester(pool, identity).await?;
    Ok(queries::list_for_member(pool, user_id).await?)
}

/// Require that `workspace_id` exists and `user_id` is a member of it.
pub async fn require_member(
    pool: &SqlitePool,
    workspace_id: i64,
    user_id: i64,
) -> Result<(), AccessError> {
    if queries::owner_of(pool, workspace_id).await?.is_none() {
        return Err(AccessError::NotFound("Workspace not found".into()));
    }
    if !queries::is_member(pool, workspace_id, user_id).await? {
        info!(workspace_id, user_id, "access refused: not a workspace member");
        return Err(AccessError::Forbidden(
            "User is not a member of workspace".into(),
        ));
    }
    Ok(())
}
