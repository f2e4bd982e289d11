//! Request handlers.

pub mod auth;
pub mod decisions;
pub mod health;
pub mod workspaces;
