use review_model::{EntityKind, IssueListQuery, IssueState, NewNote, View};
use serde_json::Value;
use tracing::info;

use super::{ControlError, ReviewControlPlane, validate_comment, validate_iid};
use crate::views::{shape, shape_all};

impl ReviewControlPlane {
    /// Lists project issues in the given state.
    ///
    /// # Errors
    /// Returns `ControlError` if no project can be resolved or the GitLab
    /// request fails.
    pub async fn list_issues(
        &self,
        project_id: Option<&str>,
        state: IssueState,
        view: View,
    ) -> Result<Vec<Value>, ControlError> {
        let project = self.resolve_project(project_id)?;
        let query = IssueListQuery {
            state,
            per_page: self.client.per_page(),
        };
        let issues = self.client.list_issues(&project, &query).await?;
        Ok(shape_all(issues, view, EntityKind::Issue))
    }

    /// Fetches an issue by iid.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid arguments or a failed GitLab request.
    pub async fn get_issue(
        &self,
        project_id: Option<&str>,
        issue_iid: &str,
        view: View,
    ) -> Result<Value, ControlError> {
        let project = self.resolve_project(project_id)?;
        let iid = validate_iid("issue_iid", issue_iid)?;
        let record = self.client.get_issue(&project, iid).await?;
        Ok(shape(record, view, EntityKind::Issue))
    }

    /// Adds a comment to an issue.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid arguments or a failed GitLab request.
    pub async fn add_issue_comment(
        &self,
        project_id: Option<&str>,
        issue_iid: &str,
        comment: &str,
    ) -> Result<Value, ControlError> {
        let project = self.resolve_project(project_id)?;
        let iid = validate_iid("issue_iid", issue_iid)?;
        let note = NewNote {
            body: validate_comment(comment)?,
        };
        let created = self.client.create_issue_note(&project, iid, &note).await?;
        info!(project = %project, issue_iid = %iid, "created issue note");
        Ok(created)
    }
}
