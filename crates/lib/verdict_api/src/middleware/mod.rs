//! HTTP middleware: origin gate and session authentication.

pub mod auth;
pub mod cors;
