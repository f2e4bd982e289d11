//! # verdict_core
//!
//! Core domain logic for Verdict: credential storage, session tokens,
//! cross-origin allow-listing and workspace/decision access rules.

pub mod access;
pub mod auth;
pub mod db;
pub mod decisions;
pub mod migrate;
pub mod models;
pub mod origin;
pub mod workspaces;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
