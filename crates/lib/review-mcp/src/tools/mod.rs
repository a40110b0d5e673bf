//! MCP tool modules.
//!
//! Tools are grouped by GitLab resource: projects, merge requests (including
//! review comments), and issues, plus contextual help.

pub mod issues;
pub mod merge_requests;
pub mod projects;
mod context;
