//! Workspace and membership request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{ApiJson, parse_id};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AddMemberRequest, CreateWorkspaceRequest, MemberResponse, WorkspaceListResponse,
    WorkspaceResponse,
};

/// `POST /api/workspaces` — create a workspace owned by the caller.
pub async fn create_workspace_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(body): ApiJson<CreateWorkspaceRequest>,
) -> AppResult<(StatusCode, Json<WorkspaceResponse>)> {
    let ws = verdict_core::workspaces::create_workspace(&state.pool, &identity, &body.name).await?;
    Ok((StatusCode::CREATED, Json(ws.into())))
}

/// `GET /api/workspaces` — workspaces the caller belongs to.
pub async fn list_workspaces_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<WorkspaceListResponse>> {
    let summaries = verdict_core::workspaces::list_workspaces(&state.pool, &identity).await?;
    Ok(Json(WorkspaceListResponse {
        workspaces: summaries.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /api/workspaces/{id}/members` — owner adds an existing user.
pub async fn add_member_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(workspace_id): Path<String>,
    ApiJson(body): ApiJson<AddMemberRequest>,
) -> AppResult<(StatusCode, Json<MemberResponse>)> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;
    let member =
        verdict_core::workspaces::add_member(&state.pool, &identity, workspace_id, &body.email)
            .await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}
