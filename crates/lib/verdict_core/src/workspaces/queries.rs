//! Workspace and membership database queries.

use sqlx::SqlitePool;

use crate::models::workspace::{MemberRole, Workspace, WorkspaceMember, WorkspaceSummary};
use crate::models::{from_micros, now_micros};

type WorkspaceRow = (i64, String, i64, String, i64);

fn workspace_from_row((id, name, owner_id, owner_email, created_at): WorkspaceRow) -> Workspace {
    Workspace {
        id,
        name,
        owner_id,
        owner_email,
        created_at: from_micros(created_at),
    }
}

/// Parse a stored role, treating anything unexpected as a decode error.
fn parse_role(role: &str) -> Result<MemberRole, sqlx::Error> {
    role.parse()
        .map_err(|e: String| sqlx::Error::Decode(e.into()))
}

/// Insert a workspace and its owner's membership row in one transaction.
/// Returns the new workspace ID.
pub async fn insert_workspace_with_owner(
    pool: &SqlitePool,
    name: &str,
    owner_id: i64,
) -> Result<i64, sqlx::Error> {
    let created_at = now_micros();
    let mut tx = pool.begin().await?;

    let workspace_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO workspaces (name, owner_id, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(owner_id)
    .bind(created_at)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO workspace_members (workspace_id, user_id, role, created_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(workspace_id)
    .bind(owner_id)
    .bind(MemberRole::Owner.as_str())
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(workspace_id)
}

/// Fetch a workspace (with its owner's email) by ID.
pub async fn get_workspace(
    pool: &SqlitePool,
    workspace_id: i64,
) -> Result<Option<Workspace>, sqlx::Error> {
    let row = sqlx::query_as::<_, WorkspaceRow>(
        r#"
        SELECT w.id, w.name, w.owner_id, u.email, w.created_at
        FROM workspaces w
        JOIN users u ON u.id = w.owner_id
        WHERE w.id = ?
        "#,
    )
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(workspace_from_row))
}

/// Owner ID of a workspace, or `None` if it does not exist.
pub async fn owner_of(pool: &SqlitePool, workspace_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT owner_id FROM workspaces WHERE id = ?")
        .bind(workspace_id)
        .fetch_optional(pool)
        .await
}

/// Check whether a user holds any membership row (owner included) in a workspace.
pub async fn is_member(
    pool: &SqlitePool,
    workspace_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM workspace_members WHERE workspace_id = ? AND user_id = ?)",
    )
    .bind(workspace_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Insert a membership row unless one already exists for the pair.
pub async fn insert_member_if_absent(
    pool: &SqlitePool,
    workspace_id: i64,
    user_id: i64,
    role: MemberRole,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO workspace_members (workspace_id, user_id, role, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (workspace_id, user_id) DO NOTHING
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .bind(role.as_str())
    .bind(now_micros())
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch one membership row joined with the member's email.
pub async fn get_membership(
    pool: &SqlitePool,
    workspace_id: i64,
    user_id: i64,
) -> Result<Option<WorkspaceMember>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, i64, String, String, i64)>(
        r#"
        SELECT wm.workspace_id, wm.user_id, u.email, wm.role, wm.created_at
        FROM workspace_members wm
        JOIN users u ON u.id = wm.user_id
        WHERE wm.workspace_id = ? AND wm.user_id = ?
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(|(workspace_id, user_id, email, role, created_at)| {
        Ok(WorkspaceMember {
            workspace_id,
            user_id,
            email,
            role: parse_role(&role)?,
            created_at: from_micros(created_at),
        })
    })
    .transpose()
}

/// List every workspace a user belongs to, with the user's role in each.
pub async fn list_for_member(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<WorkspaceSummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, i64, String, i64, String)>(
        r#"
        SELECT w.id, w.name, w.owner_id, u.email, w.created_at, wm.role
        FROM workspace_members wm
        JOIN workspaces w ON w.id = wm.workspace_id
        JOIN users u ON u.id = w.owner_id
        WHERE wm.user_id = ?
        ORDER BY w.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, name, owner_id, owner_email, created_at, role)| {
            Ok(WorkspaceSummary {
                workspace: workspace_from_row((id, name, owner_id, owner_email, created_at)),
                role: parse_role(&role)?,
            })
        })
        .collect()
}
