//! page-insights crate
//!
//! Resolves page-scoped access tokens and turns page and post insights from a
//! Graph-style analytics API into flat, report-ready rows.
//!
//! The main entry point is [`insights::InsightsClient`], which combines a
//! [`graph::Transport`], a [`credentials::CredentialStore`] and the configured
//! token sources. The `page-insights` binary wraps it in a command-line tool.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

mod commands;
mod error;

pub mod credentials;
pub mod graph;
pub mod insights;
pub mod reports;

pub use commands::{Host, run};
pub use error::Error;
