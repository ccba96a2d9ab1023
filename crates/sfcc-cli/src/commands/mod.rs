//! Subcommand implementations.

pub mod auth;
pub mod client;
pub mod ocapi;
