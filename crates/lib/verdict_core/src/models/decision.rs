//! Decision domain model.

use chrono::{DateTime, Utc};

/// A record scoped to one workspace and attributed to its creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub workspace_id: i64,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDecision {
    pub title: String,
    pub description: String,
    pub status: String,
}
