//! Core types and services for gitlab-review-mcp.
//!
//! This crate owns the GitLab REST client, the summary view projections, the
//! merge request comment classifier, and the control plane that combines
//! them for the MCP tool layer.

pub mod classify;
pub mod control;
pub mod gitlab;
pub mod views;
