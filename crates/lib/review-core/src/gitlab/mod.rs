//! GitLab REST client.
//!
//! The client layer handles authentication, URL construction, and error
//! decoding for the v4 API. Responses are returned as raw JSON so callers can
//! choose between the raw and summary views.

pub mod client;

pub use client::{GitlabClient, GitlabConfig, GitlabError, GitlabResult};
