//! Data model and view projections for gitlab-review-mcp.
//!
//! This crate defines the shapes shared by the GitLab client, the comment
//! classifier, and the MCP tool layer, plus the declarative field tables
//! used to build summary views.

pub mod models;
pub mod schema;

pub use models::*;
