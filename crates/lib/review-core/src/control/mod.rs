use std::{error::Error, fmt, sync::Arc};

use crate::classify::ClassifyError;
use crate::gitlab::{GitlabClient, GitlabError};

pub mod issues;
pub mod merge_requests;
pub mod projects;

pub use merge_requests::DiffCommentRequest;

#[derive(Debug)]
pub enum ControlError {
    Gitlab(GitlabError),
    Classify(ClassifyError),
    MissingProject,
    InvalidInput(String),
}

impl ControlError {
    /// Extra context for the error envelope, if the failure carried any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Gitlab(err) => err.details(),
            _ => None,
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gitlab(err) => write!(f, "{err}"),
            Self::Classify(err) => write!(f, "{err}"),
            Self::MissingProject => write!(
                f,
                "project_id is required (no default project is configured)"
            ),
            Self::InvalidInput(message) => write!(f, "Invalid input: {message}"),
        }
    }
}

impl Error for ControlError {}

impl From<GitlabError> for ControlError {
    fn from(err: GitlabError) -> Self {
        Self::Gitlab(err)
    }
}

impl From<ClassifyError> for ControlError {
    fn from(err: ClassifyError) -> Self {
        Self::Classify(err)
    }
}

/// Entry point for every GitLab-backed tool operation.
#[derive(Clone)]
pub struct ReviewControlPlane {
    client: Arc<GitlabClient>,
    default_project: Option<String>,
}

impl ReviewControlPlane {
    #[must_use]
    pub fn new(client: GitlabClient) -> Self {
        Self {
            client: Arc::new(client),
            default_project: None,
        }
    }

    /// Sets the project used when a caller omits `project_id`.
    #[must_use]
    pub fn with_default_project(mut self, project: Option<String>) -> Self {
        self.default_project = project
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    #[must_use]
    pub fn default_project(&self) -> Option<&str> {
        self.default_project.as_deref()
    }

    /// Picks the explicit project id, falling back to the configured default.
    ///
    /// # Errors
    /// Returns `ControlError::MissingProject` when neither is available.
    pub fn resolve_project(&self, project_id: Option<&str>) -> Result<String, ControlError> {
        project_id
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or(self.default_project.as_deref())
            .map(str::to_string)
            .ok_or(ControlError::MissingProject)
    }
}

/// Checks that a project-scoped iid is a plain decimal number.
pub(crate) fn validate_iid<'a>(name: &str, value: &'a str) -> Result<&'a str, ControlError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ControlError::InvalidInput(format!(
            "{name} must be a numeric iid, got `{value}`"
        )));
    }
    Ok(value)
}

/// Rejects blank comment bodies before they reach GitLab.
pub(crate) fn validate_comment(comment: &str) -> Result<String, ControlError> {
    if comment.trim().is_empty() {
        return Err(ControlError::InvalidInput("comment must not be empty".to_string()));
    }
    Ok(comment.to_string())
}
