//! Decision request handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use verdict_core::decisions::DecisionPatch;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{ApiJson, parse_id};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreateDecisionRequest, DecisionResponse, UpdateDecisionRequest};

/// `POST /api/workspaces/{id}/decisions` — record a decision in a workspace.
pub async fn create_decision_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(workspace_id): Path<String>,
    ApiJson(body): ApiJson<CreateDecisionRequest>,
) -> AppResult<(StatusCode, Json<DecisionResponse>)> {
    let workspace_id = parse_id(&workspace_id, "workspace")?;
    let decision = verdict_core::decisions::create_decision(
        &state.pool,
        &identity,
        workspace_id,
        &body.title,
        &body.description,
        &body.status,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(decision.into())))
}

/// `PUT|PATCH /api/decisions/{id}` — partially update a decision the caller owns.
///
/// The body is validated before any database access.
pub async fn update_decision_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(decision_id): Path<String>,
    ApiJson(body): ApiJson<UpdateDecisionRequest>,
) -> AppResult<Json<DecisionResponse>> {
    let decision_id = parse_id(&decision_id, "decision")?;
    let patch = DecisionPatch::new(
        body.title.as_deref(),
        body.description.as_deref(),
        body.status.as_deref(),
    )?;
    let decision =
        verdict_core::decisions::update_decision(&state.pool, &identity, decision_id, &patch)
            .await?;
    Ok(Json(decision.into()))
}
