//! Command-line interface for page-insights
//!
//! This module implements the CLI commands on top of [`crate::insights::InsightsClient`].
//!
//! ## Commands
//!
//! - **page**: normalized page insights, one row per period end
//! - **posts**: every post in a window with its normalized insights
//! - **token**: resolve a page token and print it masked
//! - **init**: generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. Commands that talk to the provider
//! build a [`common::Common`] first, which sets up logging, loads the
//! configuration, and wires the HTTP transport and the on-disk token store
//! into a client. Results go to CSV or JSON files, or to the terminal as
//! JSON when no report file is requested.
//!
//! Secrets come from flags or the environment only; the configuration file
//! holds non-secret settings.

mod common;
mod config;
mod host;
mod init;
mod page;
mod posts;
mod run;
mod token;

pub use host::Host;
pub use run::run;

#[cfg(test)]
pub use host::TestHost;
