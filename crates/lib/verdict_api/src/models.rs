//! Request and response bodies.
//!
//! Wire shapes use camelCase and RFC 3339 timestamps; domain types from
//! `verdict_core::models` are converted at the handler boundary.

use serde::{Deserialize, Serialize};
use verdict_core::models::auth::{IssuedToken, User};
use verdict_core::models::decision::Decision;
use verdict_core::models::workspace::{MemberRole, Workspace, WorkspaceMember, WorkspaceSummary};

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// `POST /api/signup` and `POST /api/login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkspaceRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub owner_email: String,
    pub created_at: String,
    /// Caller's role; present in listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(ws: Workspace) -> Self {
        Self {
            id: ws.id,
            name: ws.name,
            owner_id: ws.owner_id,
            owner_email: ws.owner_email,
            created_at: ws.created_at.to_rfc3339(),
            role: None,
        }
    }
}

impl From<WorkspaceSummary> for WorkspaceResponse {
    fn from(summary: WorkspaceSummary) -> Self {
        Self {
            role: Some(summary.role),
            ..summary.workspace.into()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceListResponse {
    pub workspaces: Vec<WorkspaceResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub workspace_id: i64,
    pub user_id: i64,
    pub email: String,
    pub role: MemberRole,
    pub created_at: String,
}

impl From<WorkspaceMember> for MemberResponse {
    fn from(m: WorkspaceMember) -> Self {
        Self {
            workspace_id: m.workspace_id,
            user_id: m.user_id,
            email: m.email,
            role: m.role,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDecisionRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

/// Every field optional; `null` is the same as omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDecisionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Decision> for DecisionResponse {
    fn from(d: Decision) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            status: d.status,
            workspace_id: d.workspace_id,
            owner_id: d.owner_id,
            created_at: d.created_at.to_rfc3339(),
            updated_at: d.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn update_request_treats_null_as_omitted() {
        let req: UpdateDecisionRequest =
            serde_json::from_str(r#"{"title": null, "status": "done"}"#).unwrap();
        assert!(req.title.is_none());
        assert!(req.description.is_none());
        assert_eq!(req.status.as_deref(), Some("done"));
    }

    #[test]
    fn decision_response_is_camel_case() {
        let now = Utc::now();
        let json = serde_json::to_value(DecisionResponse::from(Decision {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            status: "s".into(),
            workspace_id: 2,
            owner_id: 3,
            created_at: now,
            updated_at: now,
        }))
        .unwrap();
        assert_eq!(json["workspaceId"], 2);
        assert_eq!(json["ownerId"], 3);
        assert!(json["updatedAt"].is_string());
    }

    #[test]
    fn workspace_role_only_in_listings() {
        let ws = Workspace {
            id: 1,
            name: "n".into(),
            owner_id: 2,
            owner_email: "o@example.com".into(),
            created_at: Utc::now(),
        };
        let plain = serde_json::to_value(WorkspaceResponse::from(ws.clone())).unwrap();
        assert!(plain.get("role").is_none());
        assert_eq!(plain["ownerEmail"], "o@example.com");

        let listed = serde_json::to_value(WorkspaceResponse::from(WorkspaceSummary {
            workspace: ws,
            role: MemberRole::Member,
        }))
        .unwrap();
        assert_eq!(listed["role"], "member");
    }
}
