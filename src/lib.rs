//! CodeArtifact Dependabot rotator
//!
//! Periodically fetches a short-lived AWS CodeArtifact authorization token and
//! publishes it as an encrypted organization-level Dependabot secret, so CI
//! jobs can pull from a private registry without long-lived credentials. The
//! publish side authenticates as a GitHub App.

pub mod auth;
pub mod codeartifact;
pub mod config;
pub mod error;
pub mod github;
pub mod metrics;
pub mod rotation;
pub mod secrets;
pub mod security;
